//! Capacity fade and resistance growth between mission days.
//!
//! Calendar and cycling correlation for NMC cells: calendar terms scale
//! with `day^0.75` through an Arrhenius temperature factor, cycling terms
//! with cumulative charge throughput.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgingState {
    /// Multiplies usable energy. Never increases.
    pub capacity_fade_factor: f64,
    /// Multiplies internal resistance. Never decreases.
    pub resistance_growth_factor: f64,
    pub cycle_day: u32,
    /// Cumulative cell charge throughput, A·h.
    pub charge_throughput: f64,
}

impl Default for AgingState {
    fn default() -> Self {
        Self {
            capacity_fade_factor: 1.0,
            resistance_growth_factor: 1.0,
            cycle_day: 0,
            charge_throughput: 0.0,
        }
    }
}

/// Cell-level statistics of one mission day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DischargeSummary {
    pub mean_cell_voltage: f64,
    /// K
    pub mean_temperature: f64,
    pub depth_of_discharge: f64,
    /// Cumulative cell charge throughput at the end of the day, A·h.
    pub charge_throughput: f64,
}

impl DischargeSummary {
    /// Summarize concatenated per-point histories.
    pub fn from_series(
        cell_voltage: &[f64],
        temperature: &[f64],
        state_of_charge: &[f64],
        final_throughput: f64,
    ) -> Option<Self> {
        if cell_voltage.is_empty() || temperature.is_empty() || state_of_charge.is_empty() {
            return None;
        }
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let max = state_of_charge.iter().copied().fold(f64::MIN, f64::max);
        let min = state_of_charge.iter().copied().fold(f64::MAX, f64::min);
        Some(Self {
            mean_cell_voltage: mean(cell_voltage),
            mean_temperature: mean(temperature),
            depth_of_discharge: (max - min).clamp(0.0, 1.0),
            charge_throughput: final_throughput.max(0.0),
        })
    }
}

impl AgingState {
    /// Apply one day of aging. Factors are monotone: a milder day never
    /// restores capacity or lowers resistance.
    pub fn update(&mut self, summary: &DischargeSummary, increment_day: bool) {
        if increment_day {
            self.cycle_day += 1;
        }
        let v = summary.mean_cell_voltage;
        let temp = summary.mean_temperature.max(1.0);
        let dod = summary.depth_of_discharge;
        let q = summary.charge_throughput.max(self.charge_throughput);
        let t = f64::from(self.cycle_day);

        let alpha_cap = (7.542 * v - 23.75) * 1e6 * (-6976.0 / temp).exp();
        let alpha_res = (5.270 * v - 16.32) * 1e5 * (-5986.0 / temp).exp();
        let beta_cap = 7.348e-3 * (v - 3.667).powi(2) + 7.60e-4 + 4.081e-3 * dod;
        let beta_res = 2.153e-4 * (v - 3.725).powi(2) - 1.521e-5 + 2.798e-4 * dod;

        let fade = 1.0 - alpha_cap * t.powf(0.75) - beta_cap * q.sqrt();
        let growth = 1.0 + alpha_res * t.powf(0.75) + beta_res * q;

        if fade.is_finite() {
            self.capacity_fade_factor = self.capacity_fade_factor.min(fade).clamp(0.0, 1.0);
        }
        if growth.is_finite() {
            self.resistance_growth_factor = self.resistance_growth_factor.max(growth);
        }
        self.charge_throughput = q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(throughput: f64) -> DischargeSummary {
        DischargeSummary {
            mean_cell_voltage: 3.7,
            mean_temperature: 298.15,
            depth_of_discharge: 0.6,
            charge_throughput: throughput,
        }
    }

    #[test]
    fn aging_degrades_pack() {
        let mut aging = AgingState::default();
        aging.update(&day(3.0), true);
        assert_eq!(aging.cycle_day, 1);
        assert!(aging.capacity_fade_factor < 1.0);
        assert!(aging.resistance_growth_factor > 1.0);
    }

    #[test]
    fn factors_are_irreversible() {
        let mut aging = AgingState::default();
        aging.update(&day(30.0), true);
        let (fade, growth) = (aging.capacity_fade_factor, aging.resistance_growth_factor);
        aging.update(&day(0.0), false);
        assert!(aging.capacity_fade_factor <= fade);
        assert!(aging.resistance_growth_factor >= growth);
        assert_eq!(aging.charge_throughput, 30.0);
    }

    #[test]
    fn summary_statistics() {
        let s = DischargeSummary::from_series(&[3.6, 3.8], &[300.0, 310.0], &[1.0, 0.7, 0.4], 2.5)
            .unwrap();
        assert!((s.mean_cell_voltage - 3.7).abs() < 1e-12);
        assert!((s.mean_temperature - 305.0).abs() < 1e-12);
        assert!((s.depth_of_discharge - 0.6).abs() < 1e-12);
        assert!(DischargeSummary::from_series(&[], &[1.0], &[1.0], 0.0).is_none());
    }
}
