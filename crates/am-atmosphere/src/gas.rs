//! Calorically perfect gas properties and isentropic relations.

use am_core::constants::{GAMMA_AIR, R_AIR};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasProperties {
    pub gamma: f64,
    /// Specific gas constant, J/(kg K).
    pub gas_constant: f64,
}

impl GasProperties {
    pub fn air() -> Self {
        Self {
            gamma: GAMMA_AIR,
            gas_constant: R_AIR,
        }
    }

    /// Burned kerosene/air mixture downstream of a combustor.
    pub fn combustion_products() -> Self {
        Self {
            gamma: 1.33,
            gas_constant: 287.0,
        }
    }

    /// cp = γR/(γ−1)
    pub fn cp(&self) -> f64 {
        self.gamma * self.gas_constant / (self.gamma - 1.0)
    }

    pub fn speed_of_sound(&self, temperature: f64) -> f64 {
        (self.gamma * self.gas_constant * temperature.max(0.0)).sqrt()
    }

    /// Tt/T at Mach `mach`.
    pub fn stagnation_temperature_ratio(&self, mach: f64) -> f64 {
        1.0 + 0.5 * (self.gamma - 1.0) * mach * mach
    }

    /// Pt/P at Mach `mach`.
    pub fn stagnation_pressure_ratio(&self, mach: f64) -> f64 {
        self.stagnation_temperature_ratio(mach)
            .powf(self.gamma / (self.gamma - 1.0))
    }

    /// Pt/P above which a convergent nozzle chokes.
    pub fn critical_pressure_ratio(&self) -> f64 {
        self.stagnation_pressure_ratio(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_cp_close_to_tabulated() {
        assert!((GasProperties::air().cp() - 1004.7).abs() < 0.5);
    }

    #[test]
    fn choking_ratio_for_air() {
        assert!((GasProperties::air().critical_pressure_ratio() - 1.8929).abs() < 1e-3);
    }
}
