//! Propulsor performance evaluators.
//!
//! Each family maps (throttle, freestream, bus voltage, rotor speed) to
//! thrust, power, torque, current and fuel flow through the
//! [`ThrustProducer`] trait:
//! - electric rotor: ESC → DC motor → rotor
//! - engine rotor: reciprocating engine → rotor
//! - gas turbine: turbojet / turbofan station pipeline
//!
//! The throttle envelope (zero floor, proportional over-throttle) is
//! applied uniformly in [`envelope`].

pub mod common;
pub mod electric;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod gas_turbine;
pub mod propulsor;
pub mod rotor;
pub mod stations;

pub use electric::{ElectricRotor, Esc, Motor};
pub use engine::{EngineRotor, ReciprocatingEngine};
pub use error::{PropulsionError, PropulsionResult};
pub use gas_turbine::{CycleParameters, DesignPoint, GasTurbine};
pub use propulsor::{Propulsor, PropulsorInput, PropulsorOutput, ThrustProducer};
pub use rotor::{Airfoil, Rotor, RotorPerformance};
pub use stations::{CycleStations, NozzleExit, StagnationState, StationRecord};
