//! State container errors.

use am_core::AmError;
use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid path '{path}'")]
    InvalidPath { path: String },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Path '{path}' is a branch, expected a leaf")]
    NotALeaf { path: String },

    #[error("Path '{path}' is a leaf, expected a branch")]
    NotABranch { path: String },

    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    Shape {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Leaf '{path}' has {rows} rows but other leaves have {expected}")]
    InconsistentRows {
        path: String,
        rows: usize,
        expected: usize,
    },

    #[error("Row count must be at least one")]
    ZeroRows,
}

impl From<StateError> for AmError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::Shape { .. } | StateError::InconsistentRows { .. } => AmError::Invariant {
                what: "state container shape",
            },
            _ => AmError::InvalidArg {
                what: "state container path",
            },
        }
    }
}
