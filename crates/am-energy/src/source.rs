//! Common interface over energy-source families.

use am_network::SourceKind;

use crate::battery::BatteryPack;
use crate::fuel_tank::FuelTank;

pub trait EnergySource {
    fn kind(&self) -> SourceKind;

    /// Mass at mission start, kg.
    fn mass(&self) -> f64;

    /// Energy available at mission start, J.
    fn stored_energy(&self) -> f64;
}

impl EnergySource for BatteryPack {
    fn kind(&self) -> SourceKind {
        SourceKind::Battery
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn stored_energy(&self) -> f64 {
        self.max_energy()
    }
}

impl EnergySource for FuelTank {
    fn kind(&self) -> SourceKind {
        SourceKind::FuelTank
    }

    fn mass(&self) -> f64 {
        self.fuel_mass
    }

    fn stored_energy(&self) -> f64 {
        self.fuel_mass * self.lower_heating_value
    }
}

/// Arena element for a vehicle's energy sources.
#[derive(Clone, Debug)]
pub enum EnergyStore {
    Battery(BatteryPack),
    FuelTank(FuelTank),
}

impl EnergyStore {
    pub fn as_source(&self) -> &dyn EnergySource {
        match self {
            EnergyStore::Battery(b) => b,
            EnergyStore::FuelTank(t) => t,
        }
    }

    pub fn battery(&self) -> Option<&BatteryPack> {
        match self {
            EnergyStore::Battery(b) => Some(b),
            EnergyStore::FuelTank(_) => None,
        }
    }

    pub fn battery_mut(&mut self) -> Option<&mut BatteryPack> {
        match self {
            EnergyStore::Battery(b) => Some(b),
            EnergyStore::FuelTank(_) => None,
        }
    }

    pub fn fuel_tank(&self) -> Option<&FuelTank> {
        match self {
            EnergyStore::FuelTank(t) => Some(t),
            EnergyStore::Battery(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::thermal::ThermalModel;
    use am_core::units::kg;

    #[test]
    fn store_dispatches_to_family() {
        let pack = BatteryPack::new(Cell::nmc_18650(), 6, 10, None, ThermalModel::Isothermal)
            .unwrap();
        let store = EnergyStore::Battery(pack);
        assert_eq!(store.as_source().kind(), SourceKind::Battery);
        assert!((store.as_source().mass() - 60.0 * 0.048).abs() < 1e-12);

        let tank = EnergyStore::FuelTank(FuelTank::new(kg(100.0), 1.0).unwrap());
        assert_eq!(tank.as_source().kind(), SourceKind::FuelTank);
        assert!(tank.as_source().stored_energy() > 4.0e9);
        assert!(tank.battery().is_none());
    }
}
