//! Error types for solver operations.

use am_core::AmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Residual evaluation failed: {what}")]
    Evaluation { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for AmError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidArg { what } => AmError::InvalidArg { what },
            SolverError::DimensionMismatch { expected, found } => AmError::LengthMismatch {
                what: "solver vector",
                expected,
                found,
            },
            SolverError::Numeric { what: _ } => AmError::Invariant { what: "numeric" },
            SolverError::Evaluation { what: _ } => AmError::Invariant {
                what: "residual evaluation",
            },
        }
    }
}
