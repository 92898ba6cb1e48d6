//! Vehicle: network topology plus the model arenas it indexes.

use crate::aerodynamics::Aerodynamics;
use crate::error::{ConfigError, MissionResult};
use crate::results::MissionResults;
use am_atmosphere::{AtmosphereModel, UsStandard1976};
use am_core::units::{Area, Mass};
use am_core::{PropulsorId, SourceId};
use am_energy::{BatteryPack, DischargeSummary, EnergyStore};
use am_network::{DistributorKind, Network};
use am_propulsion::Propulsor;
use std::fmt;
use std::sync::Arc;

/// Everything a mission needs to know about the aircraft.
///
/// `propulsors[i]` and `sources[i]` are the models behind the network's
/// i-th propulsor slot and source.
#[derive(Clone)]
pub struct Vehicle {
    pub tag: String,
    /// Takeoff mass, kg.
    pub mass_takeoff: f64,
    /// Wing reference area, m².
    pub reference_area: f64,
    pub network: Network,
    pub propulsors: Vec<Propulsor>,
    pub sources: Vec<EnergyStore>,
    pub aerodynamics: Arc<dyn Aerodynamics>,
    pub atmosphere: Arc<dyn AtmosphereModel>,
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("tag", &self.tag)
            .field("mass_takeoff", &self.mass_takeoff)
            .field("reference_area", &self.reference_area)
            .field("propulsors", &self.propulsors.len())
            .field("sources", &self.sources.len())
            .field("aerodynamics", &self.aerodynamics.name())
            .field("atmosphere", &self.atmosphere.name())
            .finish()
    }
}

impl Vehicle {
    pub fn new(
        tag: impl Into<String>,
        mass_takeoff: Mass,
        reference_area: Area,
        network: Network,
        propulsors: Vec<Propulsor>,
        sources: Vec<EnergyStore>,
        aerodynamics: Arc<dyn Aerodynamics>,
    ) -> MissionResult<Self> {
        let vehicle = Self {
            tag: tag.into(),
            mass_takeoff: mass_takeoff.value,
            reference_area: reference_area.value,
            network,
            propulsors,
            sources,
            aerodynamics,
            atmosphere: Arc::new(UsStandard1976::new()),
        };
        vehicle.validate()?;
        Ok(vehicle)
    }

    pub fn with_atmosphere(mut self, atmosphere: Arc<dyn AtmosphereModel>) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: String| ConfigError::InvalidVehicle { what };
        if !self.mass_takeoff.is_finite() || self.mass_takeoff <= 0.0 {
            return Err(invalid("takeoff mass must be positive".into()));
        }
        if !self.reference_area.is_finite() || self.reference_area <= 0.0 {
            return Err(invalid("reference area must be positive".into()));
        }
        if self.propulsors.len() != self.network.propulsors().len() {
            return Err(invalid(format!(
                "{} propulsor models for {} propulsor slots",
                self.propulsors.len(),
                self.network.propulsors().len()
            )));
        }
        if self.sources.len() != self.network.sources().len() {
            return Err(invalid(format!(
                "{} energy stores for {} sources",
                self.sources.len(),
                self.network.sources().len()
            )));
        }

        for (slot, store) in self.network.sources().iter().zip(&self.sources) {
            if store.as_source().kind() != slot.kind {
                return Err(invalid(format!(
                    "source '{}' model does not match its declared kind",
                    slot.tag
                )));
            }
        }

        for (slot, model) in self.network.propulsors().iter().zip(&self.propulsors) {
            let Some(dist) = self.network.distributor(slot.distributor) else {
                return Err(invalid(format!("propulsor '{}' has no distributor", slot.tag)));
            };
            let fits = match dist.kind {
                DistributorKind::ElectricBus => model.is_electric(),
                DistributorKind::FuelLine => model.burns_fuel(),
            };
            if !fits {
                return Err(invalid(format!(
                    "{} propulsor '{}' cannot draw from '{}'",
                    am_propulsion::ThrustProducer::family(model),
                    slot.tag,
                    dist.tag
                )));
            }
        }

        for group in self.network.groups() {
            let identical = self
                .network
                .distributor(group.distributor)
                .is_some_and(|d| d.identical_propulsors);
            let Some(first) = group.members.first() else {
                continue;
            };
            if identical
                && group
                    .members
                    .iter()
                    .any(|m| self.propulsors[m.slot()] != self.propulsors[first.slot()])
            {
                return Err(invalid(format!(
                    "throttle group '{}' is flagged identical but its propulsors differ",
                    group.tag
                )));
            }
        }
        Ok(())
    }

    pub fn propulsor(&self, id: PropulsorId) -> Option<&Propulsor> {
        self.propulsors.get(id.slot())
    }

    pub fn store(&self, id: SourceId) -> Option<&EnergyStore> {
        self.sources.get(id.slot())
    }

    pub fn battery(&self, id: SourceId) -> Option<&BatteryPack> {
        self.store(id).and_then(EnergyStore::battery)
    }

    /// Total energy on board at mission start, J.
    pub fn stored_energy(&self) -> f64 {
        self.sources.iter().map(|s| s.as_source().stored_energy()).sum()
    }

    /// Age every battery pack from one mission day's results.
    ///
    /// Statistics are taken over all segments in order; the pack's
    /// accumulated throughput becomes the final throughput of the day.
    pub fn update_battery_age(
        &mut self,
        results: &MissionResults,
        increment_day: bool,
    ) -> MissionResult<()> {
        for (slot, store) in self.network.sources().iter().zip(self.sources.iter_mut()) {
            let Some(pack) = store.battery_mut() else {
                continue;
            };
            let prefix = self.network.result_prefix(&slot.tag)?;
            let mut cell_voltage = Vec::new();
            let mut temperature = Vec::new();
            let mut soc = Vec::new();
            let mut throughput = pack.aging.charge_throughput;
            for segment in &results.segments {
                let scope = &segment.conditions;
                let Ok(branch) = scope.branch(&prefix) else {
                    continue;
                };
                cell_voltage.extend(branch.values("cell_voltage_under_load")?);
                temperature.extend(branch.values("temperature")?);
                soc.extend(branch.values("state_of_charge")?);
                throughput = branch.deep_get("charge_throughput")?.last();
            }
            let Some(summary) =
                DischargeSummary::from_series(&cell_voltage, &temperature, &soc, throughput)
            else {
                continue;
            };
            pack.update_age(&summary, increment_day);
            tracing::info!(
                battery = %slot.tag,
                day = pack.aging.cycle_day,
                capacity_fade = pack.aging.capacity_fade_factor,
                resistance_growth = pack.aging.resistance_growth_factor,
                "battery aged"
            );
        }
        Ok(())
    }
}
