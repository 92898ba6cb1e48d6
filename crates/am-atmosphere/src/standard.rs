//! 1976 US standard atmosphere (geopotential layers up to 84.852 km).

use crate::error::{AtmosphereError, AtmosphereResult};
use crate::model::{AtmosphereModel, AtmosphereState};
use am_core::constants::{G0_MPS2, GAMMA_AIR, R_AIR};
use am_core::units::{k, kgpm3, mps, pa, pa_s};

const EARTH_RADIUS_M: f64 = 6_356_766.0;
const MIN_GEOPOTENTIAL_M: f64 = -5_000.0;
const MAX_GEOPOTENTIAL_M: f64 = 84_852.0;

struct Layer {
    base: f64,
    lapse: f64,
    base_temperature: f64,
    base_pressure: f64,
}

const LAYERS: [Layer; 7] = [
    Layer { base: 0.0, lapse: -0.0065, base_temperature: 288.15, base_pressure: 101_325.0 },
    Layer { base: 11_000.0, lapse: 0.0, base_temperature: 216.65, base_pressure: 22_632.06 },
    Layer { base: 20_000.0, lapse: 0.001, base_temperature: 216.65, base_pressure: 5_474.889 },
    Layer { base: 32_000.0, lapse: 0.0028, base_temperature: 228.65, base_pressure: 868.0187 },
    Layer { base: 47_000.0, lapse: 0.0, base_temperature: 270.65, base_pressure: 110.9063 },
    Layer { base: 51_000.0, lapse: -0.0028, base_temperature: 270.65, base_pressure: 66.93887 },
    Layer { base: 71_000.0, lapse: -0.002, base_temperature: 214.65, base_pressure: 3.956_420 },
];

/// Standard atmosphere with an optional uniform temperature offset
/// (ISA + ΔT). The offset changes temperature and density, not pressure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsStandard1976 {
    pub temperature_offset: f64,
}

impl UsStandard1976 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(temperature_offset: f64) -> Self {
        Self { temperature_offset }
    }

    fn geopotential(altitude_m: f64) -> f64 {
        EARTH_RADIUS_M * altitude_m / (EARTH_RADIUS_M + altitude_m)
    }

    /// Standard (offset-free) temperature and pressure at geopotential `h`.
    fn standard_tp(h: f64) -> (f64, f64) {
        let layer = LAYERS
            .iter()
            .rev()
            .find(|l| h >= l.base)
            .unwrap_or(&LAYERS[0]);
        let dh = h - layer.base;
        let t = layer.base_temperature + layer.lapse * dh;
        let p = if layer.lapse == 0.0 {
            layer.base_pressure * (-G0_MPS2 * dh / (R_AIR * layer.base_temperature)).exp()
        } else {
            layer.base_pressure * (t / layer.base_temperature).powf(-G0_MPS2 / (R_AIR * layer.lapse))
        };
        (t, p)
    }
}

/// Sutherland's law for air.
fn sutherland_viscosity(t: f64) -> f64 {
    1.458e-6 * t.powf(1.5) / (t + 110.4)
}

impl AtmosphereModel for UsStandard1976 {
    fn name(&self) -> &str {
        "us-standard-1976"
    }

    fn state(&self, altitude_m: f64) -> AtmosphereResult<AtmosphereState> {
        if !altitude_m.is_finite() {
            return Err(AtmosphereError::InvalidArg {
                what: "altitude must be finite",
            });
        }
        let raw = Self::geopotential(altitude_m.max(-0.5 * EARTH_RADIUS_M));
        let h = raw.clamp(MIN_GEOPOTENTIAL_M, MAX_GEOPOTENTIAL_M);
        if h != raw {
            tracing::debug!(altitude_m, "altitude clamped to standard atmosphere range");
        }
        let (t_std, p) = Self::standard_tp(h);
        let t = t_std + self.temperature_offset;
        if t <= 0.0 {
            return Err(AtmosphereError::NonPhysical {
                what: "temperature offset drives temperature below zero",
            });
        }
        let rho = p / (R_AIR * t);
        Ok(AtmosphereState {
            pressure: pa(p),
            temperature: k(t),
            density: kgpm3(rho),
            speed_of_sound: mps((GAMMA_AIR * R_AIR * t).sqrt()),
            dynamic_viscosity: pa_s(sutherland_viscosity(t)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * b.abs()
    }

    #[test]
    fn sea_level_matches_standard() {
        let s = UsStandard1976::new().state(0.0).unwrap();
        assert!(close(s.pressure.value, 101_325.0, 1e-12));
        assert!(close(s.temperature.value, 288.15, 1e-12));
        assert!(close(s.density.value, 1.225, 1e-3));
        assert!(close(s.speed_of_sound.value, 340.29, 1e-3));
    }

    #[test]
    fn tropopause_values() {
        let s = UsStandard1976::new().state(11_019.0).unwrap();
        assert!(close(s.temperature.value, 216.65, 1e-3));
        assert!(close(s.pressure.value, 22_632.0, 2e-3));
    }

    #[test]
    fn layers_are_continuous() {
        for l in LAYERS.iter().skip(1) {
            let below = UsStandard1976::standard_tp(l.base - 1e-6);
            let above = UsStandard1976::standard_tp(l.base);
            assert!(close(below.0, above.0, 1e-6));
            assert!(close(below.1, above.1, 1e-4));
        }
    }

    #[test]
    fn out_of_range_altitude_is_clamped() {
        let atm = UsStandard1976::new();
        let top = atm.state(200_000.0).unwrap();
        assert!(top.pressure.value > 0.0 && top.pressure.value.is_finite());
        let low = atm.state(-20_000.0).unwrap();
        assert!(low.density.value.is_finite());
    }

    #[test]
    fn offset_changes_density_not_pressure() {
        let hot = UsStandard1976::with_offset(15.0).state(1_000.0).unwrap();
        let std = UsStandard1976::new().state(1_000.0).unwrap();
        assert_eq!(hot.pressure, std.pressure);
        assert!(hot.density.value < std.density.value);
    }
}
