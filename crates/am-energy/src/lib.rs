//! Energy-source state models.
//!
//! Batteries march their electro-thermal state across control points one
//! point at a time; fuel tanks track remaining fuel. Both implement
//! [`EnergySource`] and are stored in a vehicle as [`EnergyStore`].

pub mod aging;
pub mod battery;
pub mod cell;
pub mod common;
pub mod discharge_map;
pub mod error;
pub mod fuel_tank;
pub mod source;
pub mod thermal;

pub use aging::{AgingState, DischargeSummary};
pub use battery::{BatteryHistory, BatteryPack, BatteryPoint, BatteryOutputs, TemperatureLimits};
pub use cell::{Cell, OpenCircuitModel, ResistanceModel};
pub use discharge_map::DischargeMap;
pub use error::{EnergyError, EnergyResult};
pub use fuel_tank::FuelTank;
pub use source::{EnergySource, EnergyStore};
pub use thermal::{ConductanceCooler, ThermalInputs, ThermalManagement, ThermalModel};
