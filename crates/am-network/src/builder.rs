//! Incremental network builder.

use am_core::{DistributorId, PropulsorId, SourceId};

use crate::error::NetworkResult;
use crate::network::{
    Distributor, DistributorKind, Network, PropulsorSlot, Source, SourceKind, ThrottleGroup,
};
use crate::validate;

/// Builder for a vehicle energy network.
///
/// Add distributors first, then attach sources and propulsors to them;
/// `build()` validates and freezes the topology.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    distributors: Vec<Distributor>,
    sources: Vec<Source>,
    propulsors: Vec<PropulsorSlot>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_distributor(
        &mut self,
        tag: impl Into<String>,
        kind: DistributorKind,
        identical_propulsors: bool,
    ) -> DistributorId {
        let id = DistributorId::from_index(self.distributors.len() as u32);
        self.distributors.push(Distributor {
            id,
            tag: tag.into(),
            kind,
            identical_propulsors,
            auxiliary_power: 0.0,
        });
        id
    }

    pub fn add_bus(&mut self, tag: impl Into<String>, identical_propulsors: bool) -> DistributorId {
        self.add_distributor(tag, DistributorKind::ElectricBus, identical_propulsors)
    }

    pub fn add_fuel_line(
        &mut self,
        tag: impl Into<String>,
        identical_propulsors: bool,
    ) -> DistributorId {
        self.add_distributor(tag, DistributorKind::FuelLine, identical_propulsors)
    }

    /// Constant avionics/payload draw on a distributor, W.
    pub fn set_auxiliary_power(&mut self, id: DistributorId, watts: f64) {
        if let Some(d) = self.distributors.get_mut(id.slot()) {
            d.auxiliary_power = watts;
        }
    }

    fn add_source(
        &mut self,
        tag: impl Into<String>,
        distributor: DistributorId,
        kind: SourceKind,
    ) -> SourceId {
        let id = SourceId::from_index(self.sources.len() as u32);
        self.sources.push(Source {
            id,
            tag: tag.into(),
            distributor,
            kind,
        });
        id
    }

    pub fn add_battery(&mut self, tag: impl Into<String>, bus: DistributorId) -> SourceId {
        self.add_source(tag, bus, SourceKind::Battery)
    }

    pub fn add_fuel_tank(&mut self, tag: impl Into<String>, line: DistributorId) -> SourceId {
        self.add_source(tag, line, SourceKind::FuelTank)
    }

    pub fn add_propulsor(
        &mut self,
        tag: impl Into<String>,
        distributor: DistributorId,
        group: impl Into<String>,
    ) -> PropulsorId {
        let id = PropulsorId::from_index(self.propulsors.len() as u32);
        self.propulsors.push(PropulsorSlot {
            id,
            tag: tag.into(),
            distributor,
            group: group.into(),
        });
        id
    }

    pub fn build(self) -> NetworkResult<Network> {
        validate::validate_structure(&self.distributors, &self.sources, &self.propulsors)?;
        let index = validate::build_index(&self.distributors, &self.sources, &self.propulsors)?;

        let (dist_source_offsets, dist_sources) = Self::build_adjacency(
            self.distributors.len(),
            self.sources.iter().map(|s| (s.distributor, s.id)),
        );
        let (dist_propulsor_offsets, dist_propulsors) = Self::build_adjacency(
            self.distributors.len(),
            self.propulsors.iter().map(|p| (p.distributor, p.id)),
        );
        let groups = Self::build_groups(&self.propulsors);

        Ok(Network {
            distributors: self.distributors,
            sources: self.sources,
            propulsors: self.propulsors,
            groups,
            dist_source_offsets,
            dist_sources,
            dist_propulsor_offsets,
            dist_propulsors,
            index,
        })
    }

    /// Compact distributor → member lists, members kept in arena order.
    fn build_adjacency<I>(n: usize, pairs: I) -> (Vec<usize>, Vec<am_core::Id>)
    where
        I: Iterator<Item = (DistributorId, am_core::Id)>,
    {
        let mut per: Vec<Vec<am_core::Id>> = vec![Vec::new(); n];
        for (dist, member) in pairs {
            per[dist.slot()].push(member);
        }
        let mut offsets = Vec::with_capacity(n + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for members in per {
            flat.extend(members);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }

    /// Groups in order of first appearance.
    fn build_groups(propulsors: &[PropulsorSlot]) -> Vec<ThrottleGroup> {
        let mut groups: Vec<ThrottleGroup> = Vec::new();
        for p in propulsors {
            match groups
                .iter_mut()
                .find(|g| g.tag == p.group && g.distributor == p.distributor)
            {
                Some(g) => g.members.push(p.id),
                None => groups.push(ThrottleGroup {
                    tag: p.group.clone(),
                    distributor: p.distributor,
                    members: vec![p.id],
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order() {
        let mut b = NetworkBuilder::new();
        let bus = b.add_bus("bus", true);
        let batt = b.add_battery("battery", bus);
        let p0 = b.add_propulsor("rotor_0", bus, "lift");
        let p1 = b.add_propulsor("rotor_1", bus, "lift");
        assert_eq!(bus.index(), 0);
        assert_eq!(batt.index(), 0);
        assert_eq!((p0.index(), p1.index()), (0, 1));
        assert_eq!(b.propulsors.len(), 2);
    }

    #[test]
    fn groups_collect_members() {
        let mut b = NetworkBuilder::new();
        let bus = b.add_bus("bus", false);
        b.add_battery("battery", bus);
        b.add_propulsor("a", bus, "lift");
        b.add_propulsor("b", bus, "cruise");
        b.add_propulsor("c", bus, "lift");
        let net = b.build().unwrap();
        assert_eq!(net.groups().len(), 2);
        assert_eq!(net.groups()[0].tag, "lift");
        assert_eq!(net.groups()[0].members.len(), 2);
    }
}
