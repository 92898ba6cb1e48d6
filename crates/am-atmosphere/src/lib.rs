//! Atmosphere and freestream properties for mission analysis.
//!
//! The [`AtmosphereModel`] trait is the seam the mission solver uses; the
//! 1976 US standard atmosphere is the built-in implementation.

pub mod error;
pub mod freestream;
pub mod gas;
pub mod model;
pub mod standard;

pub use error::{AtmosphereError, AtmosphereResult};
pub use freestream::Freestream;
pub use gas::GasProperties;
pub use model::{AtmosphereModel, AtmosphereState};
pub use standard::UsStandard1976;
