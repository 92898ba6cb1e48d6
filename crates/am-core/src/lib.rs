//! am-core: shared foundation for the mission solver crates.
//!
//! Contains:
//! - units (uom SI types, constructors and physical constants)
//! - numeric (Real, tolerances, guarded arithmetic, table bracketing)
//! - ids (compact arena ids for network objects)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{AmError, AmResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
