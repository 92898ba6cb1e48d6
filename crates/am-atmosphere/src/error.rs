//! Atmosphere model errors.

use am_core::AmError;
use thiserror::Error;

pub type AtmosphereResult<T> = Result<T, AtmosphereError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtmosphereError {
    /// Non-physical values (negative density, pressure, ...).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<AtmosphereError> for AmError {
    fn from(err: AtmosphereError) -> Self {
        match err {
            AtmosphereError::NonPhysical { what } => AmError::Invariant { what },
            AtmosphereError::InvalidArg { what } => AmError::InvalidArg { what },
        }
    }
}

impl From<AmError> for AtmosphereError {
    fn from(err: AmError) -> Self {
        match err {
            AmError::NonFinite { what, .. } => AtmosphereError::NonPhysical { what },
            _ => AtmosphereError::InvalidArg {
                what: "core numeric check",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_to_core_error() {
        let err: AmError = AtmosphereError::NonPhysical { what: "density" }.into();
        assert!(matches!(err, AmError::Invariant { what: "density" }));
    }
}
