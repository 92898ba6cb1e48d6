//! Validated, immutable network topology.

use am_core::{DistributorId, PropulsorId, SourceId};
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, NetworkResult};
use crate::indexing::{TagIndex, TagRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributorKind {
    ElectricBus,
    FuelLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Battery,
    FuelTank,
}

impl SourceKind {
    pub fn feeds(self, kind: DistributorKind) -> bool {
        matches!(
            (self, kind),
            (SourceKind::Battery, DistributorKind::ElectricBus)
                | (SourceKind::FuelTank, DistributorKind::FuelLine)
        )
    }
}

/// An electric bus or a fuel line.
#[derive(Debug, Clone, PartialEq)]
pub struct Distributor {
    pub id: DistributorId,
    pub tag: String,
    pub kind: DistributorKind,
    /// Members of a throttle group share one evaluation.
    pub identical_propulsors: bool,
    /// Constant non-propulsive draw (avionics, payload), W.
    pub auxiliary_power: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: SourceId,
    pub tag: String,
    pub distributor: DistributorId,
    pub kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropulsorSlot {
    pub id: PropulsorId,
    pub tag: String,
    pub distributor: DistributorId,
    /// Throttle group tag.
    pub group: String,
}

/// Propulsors on one distributor driven by the same throttle command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleGroup {
    pub tag: String,
    pub distributor: DistributorId,
    /// In declaration order; the first member is evaluated when the
    /// distributor is flagged as having identical propulsors.
    pub members: Vec<PropulsorId>,
}

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) distributors: Vec<Distributor>,
    pub(crate) sources: Vec<Source>,
    pub(crate) propulsors: Vec<PropulsorSlot>,
    pub(crate) groups: Vec<ThrottleGroup>,
    /// Distributor i's sources are `dist_sources[dist_source_offsets[i]..dist_source_offsets[i+1]]`.
    pub(crate) dist_source_offsets: Vec<usize>,
    pub(crate) dist_sources: Vec<SourceId>,
    pub(crate) dist_propulsor_offsets: Vec<usize>,
    pub(crate) dist_propulsors: Vec<PropulsorId>,
    pub(crate) index: TagIndex,
}

impl Network {
    pub fn distributors(&self) -> &[Distributor] {
        &self.distributors
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn propulsors(&self) -> &[PropulsorSlot] {
        &self.propulsors
    }

    pub fn groups(&self) -> &[ThrottleGroup] {
        &self.groups
    }

    pub fn distributor(&self, id: DistributorId) -> Option<&Distributor> {
        self.distributors.get(id.slot())
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(id.slot())
    }

    pub fn propulsor(&self, id: PropulsorId) -> Option<&PropulsorSlot> {
        self.propulsors.get(id.slot())
    }

    pub fn sources_of(&self, id: DistributorId) -> &[SourceId] {
        let i = id.slot();
        if i >= self.distributors.len() {
            return &[];
        }
        &self.dist_sources[self.dist_source_offsets[i]..self.dist_source_offsets[i + 1]]
    }

    pub fn propulsors_of(&self, id: DistributorId) -> &[PropulsorId] {
        let i = id.slot();
        if i >= self.distributors.len() {
            return &[];
        }
        &self.dist_propulsors[self.dist_propulsor_offsets[i]..self.dist_propulsor_offsets[i + 1]]
    }

    pub fn groups_of(&self, id: DistributorId) -> impl Iterator<Item = &ThrottleGroup> {
        self.groups.iter().filter(move |g| g.distributor == id)
    }

    /// Battery feeding an electric bus.
    pub fn battery_of(&self, id: DistributorId) -> Option<SourceId> {
        self.sources_of(id)
            .iter()
            .copied()
            .find(|s| self.sources[s.slot()].kind == SourceKind::Battery)
    }

    /// The group a propulsor belongs to.
    pub fn group_of(&self, id: PropulsorId) -> Option<&ThrottleGroup> {
        self.groups.iter().find(|g| g.members.contains(&id))
    }

    /// Propulsor whose evaluation `id` reuses: the first member of its group
    /// on an identical-propulsor distributor, otherwise `id` itself.
    pub fn evaluation_leader(&self, id: PropulsorId) -> PropulsorId {
        let Some(slot) = self.propulsor(id) else {
            return id;
        };
        let identical = self
            .distributor(slot.distributor)
            .is_some_and(|d| d.identical_propulsors);
        if !identical {
            return id;
        }
        self.group_of(id)
            .and_then(|g| g.members.first().copied())
            .unwrap_or(id)
    }

    /// Propulsors that must actually be evaluated, in arena order.
    pub fn evaluated_propulsors(&self) -> Vec<PropulsorId> {
        self.propulsors
            .iter()
            .map(|p| p.id)
            .filter(|id| self.evaluation_leader(*id) == *id)
            .collect()
    }

    pub fn lookup(&self, tag: &str) -> NetworkResult<TagRef> {
        self.index
            .get(tag)
            .ok_or_else(|| NetworkError::TagNotFound { tag: tag.into() })
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    /// Dotted-path prefix under which a propulsor or source writes results.
    pub fn result_prefix(&self, tag: &str) -> NetworkResult<String> {
        let dist = match self.lookup(tag)? {
            TagRef::Distributor(_) => return Ok(format!("energy.{tag}")),
            TagRef::Source(id) => self.sources[id.slot()].distributor,
            TagRef::Propulsor(id) => self.propulsors[id.slot()].distributor,
        };
        Ok(format!("energy.{}.{}", self.distributors[dist.slot()].tag, tag))
    }
}
