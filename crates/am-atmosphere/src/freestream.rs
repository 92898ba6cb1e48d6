//! Freestream conditions seen by the vehicle at one control point.

use crate::error::AtmosphereResult;
use crate::model::AtmosphereModel;
use am_core::constants::G0_MPS2;

/// Per-point freestream state in plain SI values.
///
/// Kept as `f64` fields because it is rebuilt for every control point on
/// every residual evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Freestream {
    /// Geometric altitude, m.
    pub altitude: f64,
    /// True air speed, m/s.
    pub velocity: f64,
    pub density: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub speed_of_sound: f64,
    pub dynamic_viscosity: f64,
    pub mach_number: f64,
    pub dynamic_pressure: f64,
    /// Unit Reynolds number, 1/m.
    pub reynolds_per_length: f64,
    pub gravity: f64,
}

impl Freestream {
    pub fn at(model: &dyn AtmosphereModel, altitude: f64, velocity: f64) -> AtmosphereResult<Self> {
        let air = model.state(altitude)?;
        let density = air.density.value;
        let a = air.speed_of_sound.value;
        let mu = air.dynamic_viscosity.value;
        let speed = velocity.abs();
        Ok(Self {
            altitude,
            velocity,
            density,
            pressure: air.pressure.value,
            temperature: air.temperature.value,
            speed_of_sound: a,
            dynamic_viscosity: mu,
            mach_number: speed / a,
            dynamic_pressure: 0.5 * density * speed * speed,
            reynolds_per_length: density * speed / mu,
            gravity: G0_MPS2,
        })
    }

    /// Sea-level standard day, at rest.
    pub fn sea_level_static() -> Self {
        Self::at(&crate::UsStandard1976::new(), 0.0, 0.0).unwrap_or(Self {
            density: am_core::constants::SEA_LEVEL_DENSITY_KGPM3,
            pressure: am_core::constants::SEA_LEVEL_PRESSURE_PA,
            temperature: am_core::constants::SEA_LEVEL_TEMPERATURE_K,
            speed_of_sound: 340.294,
            dynamic_viscosity: 1.789e-5,
            gravity: G0_MPS2,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UsStandard1976;

    #[test]
    fn dynamic_pressure_and_mach() {
        let fs = Freestream::at(&UsStandard1976::new(), 0.0, 100.0).unwrap();
        assert!((fs.dynamic_pressure - 0.5 * fs.density * 1.0e4).abs() < 1e-9);
        assert!((fs.mach_number - 100.0 / fs.speed_of_sound).abs() < 1e-15);
    }

    #[test]
    fn static_sea_level_has_zero_speed_terms() {
        let fs = Freestream::sea_level_static();
        assert_eq!(fs.mach_number, 0.0);
        assert_eq!(fs.dynamic_pressure, 0.0);
        assert!(fs.density > 1.2);
    }
}
