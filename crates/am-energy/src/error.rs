//! Error types for energy-source models.

use am_core::AmError;
use am_state::StateError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EnergyError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Table I/O error: {message}")]
    Io { message: String },

    #[error("State container error: {0}")]
    State(#[from] StateError),
}

pub type EnergyResult<T> = Result<T, EnergyError>;

impl From<AmError> for EnergyError {
    fn from(e: AmError) -> Self {
        match e {
            AmError::NonFinite { what, .. } => EnergyError::NonPhysical { what },
            AmError::LengthMismatch {
                what,
                expected,
                found,
            } => EnergyError::LengthMismatch {
                what,
                expected,
                found,
            },
            AmError::InvalidArg { what }
            | AmError::Invariant { what }
            | AmError::IndexOob { what, .. } => EnergyError::InvalidArg { what },
        }
    }
}

impl From<EnergyError> for AmError {
    fn from(e: EnergyError) -> Self {
        match e {
            EnergyError::NonPhysical { what } => AmError::Invariant { what },
            EnergyError::InvalidArg { what } => AmError::InvalidArg { what },
            EnergyError::LengthMismatch {
                what,
                expected,
                found,
            } => AmError::LengthMismatch {
                what,
                expected,
                found,
            },
            EnergyError::Io { .. } => AmError::InvalidArg {
                what: "energy table i/o",
            },
            EnergyError::State(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EnergyError::NonPhysical { what: "capacity" };
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn error_conversion() {
        let am: AmError = EnergyError::InvalidArg { what: "cells" }.into();
        assert!(matches!(am, AmError::InvalidArg { what: "cells" }));
    }
}
