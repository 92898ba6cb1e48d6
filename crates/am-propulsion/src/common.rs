//! Common utilities for propulsor calculations.

use crate::error::{PropulsionError, PropulsionResult};
use am_core::numeric::ensure_finite;

/// Rotor speeds below this are treated as stopped, rad/s (~1 RPM).
pub const OMEGA_MIN: f64 = 0.1;

pub fn check_finite(value: f64, what: &'static str) -> PropulsionResult<()> {
    ensure_finite(value, what).map_err(|_| PropulsionError::NonPhysical { what })?;
    Ok(())
}

pub fn check_positive(value: f64, what: &'static str) -> PropulsionResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(PropulsionError::InvalidArg { what });
    }
    Ok(())
}

/// Efficiency-like parameter in (0, 1].
pub fn check_fraction(value: f64, what: &'static str) -> PropulsionResult<()> {
    check_positive(value, what)?;
    if value > 1.0 {
        return Err(PropulsionError::InvalidArg { what });
    }
    Ok(())
}

/// Torque from power with the speed floored at [`OMEGA_MIN`].
pub fn power_to_torque(power: f64, omega: f64) -> f64 {
    power / omega.abs().max(OMEGA_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_speed_regularization() {
        assert_eq!(power_to_torque(1.0, 0.0), 1.0 / OMEGA_MIN);
        assert_eq!(power_to_torque(100.0, 10.0), 10.0);
    }

    #[test]
    fn fractions() {
        assert!(check_fraction(0.95, "eta").is_ok());
        assert!(check_fraction(1.2, "eta").is_err());
        assert!(check_fraction(0.0, "eta").is_err());
    }
}
