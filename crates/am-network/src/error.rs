//! Network construction and validation errors.

use am_core::{AmError, DistributorId, PropulsorId, SourceId};

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Two objects share a tag.
    DuplicateTag { tag: String },

    /// A tag is empty or contains `.`.
    InvalidTag { tag: String },

    /// A source refers to a distributor that doesn't exist.
    InvalidSourceRef {
        source: SourceId,
        distributor: DistributorId,
    },

    /// A propulsor refers to a distributor that doesn't exist.
    InvalidPropulsorRef {
        propulsor: PropulsorId,
        distributor: DistributorId,
    },

    /// A battery on a fuel line or a tank on a bus.
    KindMismatch { tag: String },

    /// An electric bus needs exactly one battery, a fuel line at least one tank.
    SourceCount { distributor: String, count: usize },

    /// Auxiliary power must be finite and non-negative.
    InvalidAuxiliaryPower { distributor: String },

    /// Tag not found in the index.
    TagNotFound { tag: String },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateTag { tag } => write!(f, "Tag '{}' is used more than once", tag),
            NetworkError::InvalidTag { tag } => {
                write!(f, "Tag '{}' must be non-empty and contain no '.'", tag)
            }
            NetworkError::InvalidSourceRef {
                source,
                distributor,
            } => write!(
                f,
                "Source {} refers to non-existent distributor {}",
                source, distributor
            ),
            NetworkError::InvalidPropulsorRef {
                propulsor,
                distributor,
            } => write!(
                f,
                "Propulsor {} refers to non-existent distributor {}",
                propulsor, distributor
            ),
            NetworkError::KindMismatch { tag } => {
                write!(f, "Source '{}' does not match its distributor kind", tag)
            }
            NetworkError::SourceCount { distributor, count } => write!(
                f,
                "Distributor '{}' has {} energy sources (bus: exactly 1 battery, fuel line: at least 1 tank)",
                distributor, count
            ),
            NetworkError::InvalidAuxiliaryPower { distributor } => write!(
                f,
                "Distributor '{}' has a negative or non-finite auxiliary power",
                distributor
            ),
            NetworkError::TagNotFound { tag } => write!(f, "Tag '{}' not found", tag),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for AmError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::TagNotFound { .. } => AmError::InvalidArg {
                what: "network tag not found",
            },
            _ => AmError::Invariant {
                what: "network topology",
            },
        }
    }
}
