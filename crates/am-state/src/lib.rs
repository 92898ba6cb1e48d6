//! State container for per-control-point mission quantities.
//!
//! A [`Conditions`] tree maps dotted paths (`freestream.density`,
//! `energy.bus.battery.state_of_charge`) to row-major [`Series`] with one
//! row per control point. After [`Conditions::expand`] every leaf has the
//! same row count.

pub mod conditions;
pub mod error;
pub mod nonfinite;
pub mod series;

pub use conditions::{Conditions, Node};
pub use error::{StateError, StateResult};
pub use series::Series;
