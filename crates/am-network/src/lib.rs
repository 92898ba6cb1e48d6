//! Energy-network topology for mission analysis.
//!
//! A vehicle's network is a set of distributors (electric buses and fuel
//! lines), each feeding its propulsors from its energy sources. Objects
//! live in arenas addressed by compact ids; string tags are resolved once
//! through [`TagIndex`].

pub mod builder;
pub mod error;
pub mod indexing;
pub mod network;
pub mod validate;

pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use indexing::{TagIndex, TagRef};
pub use network::{
    Distributor, DistributorKind, Network, PropulsorSlot, Source, SourceKind, ThrottleGroup,
};
