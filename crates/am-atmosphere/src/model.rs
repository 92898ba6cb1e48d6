//! Atmosphere model trait.

use crate::error::AtmosphereResult;
use am_core::units::{Density, DynVisc, Pressure, Temperature, Velocity};

/// Static air properties at one altitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub density: Density,
    pub speed_of_sound: Velocity,
    pub dynamic_viscosity: DynVisc,
}

/// Altitude → static air properties.
///
/// Implementations never fail for out-of-range altitudes; they clamp or
/// extrapolate so a solver iterate that wanders outside the table still
/// produces finite residuals.
pub trait AtmosphereModel: Send + Sync {
    fn name(&self) -> &str;

    /// Properties at geometric altitude `altitude_m` (meters).
    fn state(&self, altitude_m: f64) -> AtmosphereResult<AtmosphereState>;
}
