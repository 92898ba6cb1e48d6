//! Error types for mission setup and evaluation.

use am_atmosphere::AtmosphereError;
use am_energy::EnergyError;
use am_network::NetworkError;
use am_propulsion::PropulsionError;
use am_solver::SolverError;
use am_state::StateError;
use thiserror::Error;

/// Setup problems detected before any solve starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown '{unknown}' pairs with missing residual '{residual}'")]
    UnpairedUnknown { unknown: String, residual: String },

    #[error("residual '{residual}' has no paired unknown")]
    UnpairedResidual { residual: String },

    #[error("unknown '{unknown}' has length {found}, residual expects {expected}")]
    LengthMismatch {
        unknown: String,
        expected: usize,
        found: usize,
    },

    #[error("segment '{segment}': {what}")]
    InvalidSegment { segment: String, what: String },

    #[error("vehicle: {what}")]
    InvalidVehicle { what: String },

    #[error("duplicate segment tag '{tag}'")]
    DuplicateSegment { tag: String },
}

#[derive(Error, Debug)]
pub enum MissionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] am_core::AmError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Energy error: {0}")]
    Energy(#[from] EnergyError),

    #[error("Propulsion error: {0}")]
    Propulsion(#[from] PropulsionError),

    #[error("Atmosphere error: {0}")]
    Atmosphere(#[from] AtmosphereError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type MissionResult<T> = Result<T, MissionError>;

impl MissionError {
    pub fn segment(segment: &str, what: impl Into<String>) -> Self {
        MissionError::Config(ConfigError::InvalidSegment {
            segment: segment.to_string(),
            what: what.into(),
        })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, MissionError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_display_names() {
        let err = ConfigError::UnpairedUnknown {
            unknown: "throttle".into(),
            residual: "forces_x".into(),
        };
        assert!(err.to_string().contains("forces_x"));
        let mission: MissionError = err.into();
        assert!(mission.is_config());
    }
}
