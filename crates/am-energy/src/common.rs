//! Shared helpers for energy-source calculations.

use crate::error::{EnergyError, EnergyResult};
use am_core::numeric::{ensure_finite, finite_or};

/// Smallest voltage used as a divisor, V.
pub const EPSILON_VOLTAGE: f64 = 1e-6;

/// Smallest resistance treated as non-zero, ohm.
pub const EPSILON_RESISTANCE: f64 = 1e-12;

pub fn check_finite(value: f64, what: &'static str) -> EnergyResult<()> {
    ensure_finite(value, what).map_err(|_| EnergyError::NonPhysical { what })?;
    Ok(())
}

pub fn check_positive(value: f64, what: &'static str) -> EnergyResult<()> {
    check_finite(value, what)?;
    if value <= 0.0 {
        return Err(EnergyError::InvalidArg { what });
    }
    Ok(())
}

/// Keep `previous` when a recurrence produced a non-finite value.
pub fn carry_forward(value: f64, previous: f64, what: &'static str) -> f64 {
    if !value.is_finite() {
        tracing::warn!(quantity = what, previous, "non-finite value replaced by previous value");
    }
    finite_or(value, previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_forward_keeps_previous_on_nan() {
        assert_eq!(carry_forward(f64::NAN, 3.0, "x"), 3.0);
        assert_eq!(carry_forward(2.0, 3.0, "x"), 2.0);
    }

    #[test]
    fn check_positive_rejects_zero() {
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(f64::INFINITY, "x").is_err());
        assert!(check_positive(1.0, "x").is_ok());
    }
}
