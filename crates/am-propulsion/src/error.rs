//! Error types for propulsor evaluation.

use am_atmosphere::AtmosphereError;
use am_core::AmError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PropulsionError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Atmosphere error: {0}")]
    Atmosphere(#[from] AtmosphereError),
}

pub type PropulsionResult<T> = Result<T, PropulsionError>;

impl From<PropulsionError> for AmError {
    fn from(e: PropulsionError) -> Self {
        match e {
            PropulsionError::NonPhysical { what } => AmError::Invariant { what },
            PropulsionError::InvalidArg { what } | PropulsionError::NotSupported { what } => {
                AmError::InvalidArg { what }
            }
            PropulsionError::Atmosphere(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PropulsionError::NonPhysical { what: "tip speed" };
        assert!(err.to_string().contains("tip speed"));
    }

    #[test]
    fn error_conversion() {
        let am: AmError = PropulsionError::InvalidArg { what: "blades" }.into();
        assert!(matches!(am, AmError::InvalidArg { .. }));
    }
}
