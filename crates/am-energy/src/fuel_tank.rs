//! Fuel tank mass bookkeeping.

use am_core::units::Mass;

use crate::common::check_positive;
use crate::error::{EnergyError, EnergyResult};

#[derive(Clone, Debug, PartialEq)]
pub struct FuelTank {
    /// Fuel on board at mission start, kg.
    pub fuel_mass: f64,
    /// Share of its fuel line's draw taken from this tank.
    pub fuel_selector_ratio: f64,
    /// J/kg
    pub lower_heating_value: f64,
}

impl FuelTank {
    pub const JET_A_LHV: f64 = 43.02e6;

    pub fn new(fuel_mass: Mass, fuel_selector_ratio: f64) -> EnergyResult<Self> {
        let fuel_mass = fuel_mass.value;
        if !fuel_mass.is_finite() || fuel_mass < 0.0 {
            return Err(EnergyError::InvalidArg {
                what: "fuel mass must be non-negative",
            });
        }
        check_positive(fuel_selector_ratio, "fuel selector ratio")?;
        Ok(Self {
            fuel_mass,
            fuel_selector_ratio,
            lower_heating_value: Self::JET_A_LHV,
        })
    }

    /// Remaining fuel at each point given the cumulative mass drawn from
    /// this tank since the segment start. Clamped at empty.
    pub fn remaining(&self, initial: f64, cumulative_draw: &[f64]) -> Vec<f64> {
        let mut empty = false;
        let out = cumulative_draw
            .iter()
            .map(|drawn| {
                let m = initial - drawn;
                if m < 0.0 {
                    empty = true;
                }
                m.max(0.0)
            })
            .collect();
        if empty {
            tracing::warn!(initial, "fuel tank ran dry, remaining mass clamped at zero");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::units::kg;

    #[test]
    fn remaining_clamps_at_empty() {
        let tank = FuelTank::new(kg(10.0), 1.0).unwrap();
        assert_eq!(tank.remaining(10.0, &[0.0, 4.0, 12.0]), vec![10.0, 6.0, 0.0]);
    }

    #[test]
    fn negative_fuel_rejected() {
        assert!(FuelTank::new(kg(-1.0), 1.0).is_err());
        assert!(FuelTank::new(kg(1.0), 0.0).is_err());
    }
}
