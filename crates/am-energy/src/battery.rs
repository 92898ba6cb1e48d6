//! Battery pack electro-thermal model.
//!
//! The pack state is marched one control point at a time: outputs at point
//! `t` depend only on the state at `t` and that point's power demand, and
//! the state at `t+1` is computed from them. Restarting the march from any
//! recorded state reproduces the remaining points exactly.

use am_core::constants::SECONDS_PER_HOUR;
use am_core::numeric::guarded_div;
use am_core::units::Mass;
use am_state::{Conditions, Series};

use crate::aging::{AgingState, DischargeSummary};
use crate::cell::Cell;
use crate::common::{EPSILON_RESISTANCE, EPSILON_VOLTAGE, carry_forward, check_positive};
use crate::error::{EnergyError, EnergyResult};
use crate::thermal::{ThermalInputs, ThermalModel};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemperatureLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min: 233.15,
            max: 333.15,
        }
    }
}

/// Marched state at one control point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryPoint {
    /// Stored energy, J.
    pub energy: f64,
    /// K
    pub temperature: f64,
    /// Cumulative cell charge throughput, A·h.
    pub charge_throughput: f64,
}

/// Electrical response at one control point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatteryOutputs {
    pub state_of_charge: f64,
    pub voltage_open_circuit: f64,
    pub voltage_under_load: f64,
    pub internal_resistance: f64,
    pub current: f64,
    pub power: f64,
    pub heat_generated: f64,
    /// Cell temperature from the discharge map, when tabulated.
    pub map_temperature: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct BatteryPack {
    pub cell: Cell,
    pub cells_series: u32,
    pub cells_parallel: u32,
    /// Total pack mass including packaging, kg.
    pub mass: f64,
    pub thermal: ThermalModel,
    pub temperature_limits: TemperatureLimits,
    pub aging: AgingState,
}

impl BatteryPack {
    pub fn new(
        cell: Cell,
        cells_series: u32,
        cells_parallel: u32,
        mass: Option<Mass>,
        thermal: ThermalModel,
    ) -> EnergyResult<Self> {
        cell.validate()?;
        if cells_series == 0 || cells_parallel == 0 {
            return Err(EnergyError::InvalidArg {
                what: "pack needs at least one cell in series and in parallel",
            });
        }
        if matches!(thermal, ThermalModel::Tabulated) && cell.discharge_map().is_none() {
            return Err(EnergyError::InvalidArg {
                what: "tabulated thermal model needs a discharge map",
            });
        }
        if let ThermalModel::Lumped { conductance } = thermal {
            if !conductance.is_finite() || conductance < 0.0 {
                return Err(EnergyError::InvalidArg {
                    what: "lumped thermal conductance",
                });
            }
        }
        let cell_mass = cell.mass * f64::from(cells_series * cells_parallel);
        let mass = mass.map_or(cell_mass, |m| m.value);
        check_positive(mass, "pack mass")?;
        Ok(Self {
            cell,
            cells_series,
            cells_parallel,
            mass,
            thermal,
            temperature_limits: TemperatureLimits::default(),
            aging: AgingState::default(),
        })
    }

    pub fn with_temperature_limits(mut self, limits: TemperatureLimits) -> Self {
        self.temperature_limits = limits;
        self
    }

    fn series(&self) -> f64 {
        f64::from(self.cells_series)
    }

    fn parallel(&self) -> f64 {
        f64::from(self.cells_parallel)
    }

    /// Usable energy of the aged pack, J.
    pub fn max_energy(&self) -> f64 {
        self.cell.nominal_energy() * self.series() * self.parallel() * self.aging.capacity_fade_factor
    }

    pub fn nominal_voltage(&self) -> f64 {
        self.cell.nominal_voltage * self.series()
    }

    /// Pack resistance at `soc`, including resistance growth.
    pub fn resistance(&self, soc: f64) -> f64 {
        self.cell.internal_resistance(soc) * self.aging.resistance_growth_factor * self.series()
            / self.parallel()
    }

    pub fn open_circuit_voltage(&self, soc: f64, temperature: f64) -> EnergyResult<f64> {
        Ok(self.cell.open_circuit_voltage(soc, temperature)? * self.series())
    }

    /// State at `soc`, with the pack's accumulated throughput.
    pub fn initial_point(&self, soc: f64, temperature: f64) -> BatteryPoint {
        BatteryPoint {
            energy: soc.clamp(0.0, 1.0) * self.max_energy(),
            temperature,
            charge_throughput: self.aging.charge_throughput,
        }
    }

    /// Outputs at one point from the state there and the demanded power.
    pub fn evaluate_point(&self, state: &BatteryPoint, power: f64) -> EnergyResult<BatteryOutputs> {
        let e_max = self.max_energy();
        let soc = guarded_div(state.energy, e_max, 0.0).clamp(0.0, 1.0);
        let depleted = state.energy <= 0.0;

        let (v_oc, resistance, current, map_temperature) = match self.cell.discharge_map() {
            Some(map) => {
                let v_oc = map.voltage_at(0.0, state.temperature, soc)? * self.series();
                let p_cell = power / (self.series() * self.parallel());
                let (i_cell, v_cell) = Cell::map_current(
                    map,
                    p_cell,
                    state.temperature,
                    soc,
                    self.cell.nominal_voltage,
                )?;
                let current = i_cell * self.parallel();
                let v_ul = v_cell * self.series();
                let resistance = guarded_div(v_oc - v_ul, current, 0.0).max(0.0);
                let t_cell = map.temperature_at(i_cell, state.temperature, soc)?;
                (v_oc, resistance, current, Some(t_cell))
            }
            None => {
                let v_oc = self.open_circuit_voltage(soc, state.temperature)?;
                let r = self.resistance(soc);
                (v_oc, r, Self::current_for_power(power, v_oc, r), None)
            }
        };

        if depleted {
            return Ok(BatteryOutputs {
                state_of_charge: 0.0,
                voltage_open_circuit: v_oc,
                voltage_under_load: 0.0,
                internal_resistance: resistance,
                current: 0.0,
                power,
                heat_generated: 0.0,
                map_temperature,
            });
        }

        Ok(BatteryOutputs {
            state_of_charge: soc,
            voltage_open_circuit: v_oc,
            voltage_under_load: v_oc - current * resistance,
            internal_resistance: resistance,
            current,
            power,
            heat_generated: current * current * resistance,
            map_temperature,
        })
    }

    /// Current from `P = V_oc·I − R·I²`, taking the low-current root.
    ///
    /// Beyond the maximum-power point the current is held at `V_oc / 2R`.
    pub fn current_for_power(power: f64, v_oc: f64, resistance: f64) -> f64 {
        if v_oc.abs() < EPSILON_VOLTAGE {
            return 0.0;
        }
        if resistance < EPSILON_RESISTANCE {
            return power / v_oc;
        }
        let disc = v_oc * v_oc - 4.0 * resistance * power;
        if disc < 0.0 {
            tracing::debug!(power, v_oc, resistance, "power above pack maximum, current capped");
            return v_oc / (2.0 * resistance);
        }
        (v_oc - disc.sqrt()) / (2.0 * resistance)
    }

    /// State at `t+1` from the state and outputs at `t`.
    pub fn advance(
        &self,
        state: &BatteryPoint,
        out: &BatteryOutputs,
        dt: f64,
        ambient_temperature: f64,
    ) -> BatteryPoint {
        let e_max = self.max_energy();
        let energy = (state.energy - (out.power + out.heat_generated) * dt).clamp(0.0, e_max);
        let cell_current = out.current / self.parallel();
        let throughput = state.charge_throughput + cell_current * dt / SECONDS_PER_HOUR;

        let temperature = match (&self.thermal, out.map_temperature) {
            (ThermalModel::Tabulated, Some(t_cell)) => t_cell,
            (model, _) => {
                let inputs = ThermalInputs {
                    pack_temperature: state.temperature,
                    ambient_temperature,
                    heat_generated: out.heat_generated,
                    current: out.current,
                    dt,
                };
                let heat_capacity = self.mass * self.cell.specific_heat;
                state.temperature + model.temperature_rate(&inputs, heat_capacity) * dt
            }
        };
        let temperature = temperature.clamp(self.temperature_limits.min, self.temperature_limits.max);

        BatteryPoint {
            energy: carry_forward(energy, state.energy, "battery energy"),
            temperature: carry_forward(temperature, state.temperature, "battery temperature"),
            charge_throughput: carry_forward(
                throughput,
                state.charge_throughput,
                "battery charge throughput",
            ),
        }
    }

    /// March the pack across all control points.
    ///
    /// `power`, `time` and `ambient_temperature` hold one value per point;
    /// positive power discharges the pack.
    pub fn march(
        &self,
        initial: BatteryPoint,
        power: &[f64],
        time: &[f64],
        ambient_temperature: &[f64],
    ) -> EnergyResult<BatteryHistory> {
        let n = power.len();
        if n == 0 {
            return Err(EnergyError::InvalidArg {
                what: "battery march needs at least one point",
            });
        }
        for (len, what) in [
            (time.len(), "battery time grid"),
            (ambient_temperature.len(), "battery ambient temperature"),
        ] {
            if len != n {
                return Err(EnergyError::LengthMismatch {
                    what,
                    expected: n,
                    found: len,
                });
            }
        }

        let mut history = BatteryHistory::with_capacity(n);
        let mut state = initial;
        for t in 0..n {
            let out = self.evaluate_point(&state, power[t])?;
            history.push(&state, &out, self.parallel(), self.series());
            if t + 1 < n {
                let dt = time[t + 1] - time[t];
                state = self.advance(&state, &out, dt, ambient_temperature[t]);
            }
        }
        history.capacity_fade_factor = self.aging.capacity_fade_factor;
        history.resistance_growth_factor = self.aging.resistance_growth_factor;
        Ok(history)
    }

    /// Age the pack after a mission day.
    pub fn update_age(&mut self, summary: &DischargeSummary, increment_day: bool) {
        self.aging.update(summary, increment_day);
    }
}

/// Per-point battery results of one march.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatteryHistory {
    pub energy: Vec<f64>,
    pub state_of_charge: Vec<f64>,
    pub temperature: Vec<f64>,
    pub charge_throughput: Vec<f64>,
    pub voltage_open_circuit: Vec<f64>,
    pub voltage_under_load: Vec<f64>,
    pub cell_voltage_under_load: Vec<f64>,
    pub internal_resistance: Vec<f64>,
    pub current: Vec<f64>,
    pub cell_current: Vec<f64>,
    pub power: Vec<f64>,
    pub heat_generated: Vec<f64>,
    pub capacity_fade_factor: f64,
    pub resistance_growth_factor: f64,
}

impl BatteryHistory {
    fn with_capacity(n: usize) -> Self {
        let v = || Vec::with_capacity(n);
        Self {
            energy: v(),
            state_of_charge: v(),
            temperature: v(),
            charge_throughput: v(),
            voltage_open_circuit: v(),
            voltage_under_load: v(),
            cell_voltage_under_load: v(),
            internal_resistance: v(),
            current: v(),
            cell_current: v(),
            power: v(),
            heat_generated: v(),
            capacity_fade_factor: 1.0,
            resistance_growth_factor: 1.0,
        }
    }

    fn push(&mut self, state: &BatteryPoint, out: &BatteryOutputs, parallel: f64, series: f64) {
        self.energy.push(state.energy);
        self.state_of_charge.push(out.state_of_charge);
        self.temperature.push(state.temperature);
        self.charge_throughput.push(state.charge_throughput);
        self.voltage_open_circuit.push(out.voltage_open_circuit);
        self.voltage_under_load.push(out.voltage_under_load);
        self.cell_voltage_under_load.push(out.voltage_under_load / series);
        self.internal_resistance.push(out.internal_resistance);
        self.current.push(out.current);
        self.cell_current.push(out.current / parallel);
        self.power.push(out.power);
        self.heat_generated.push(out.heat_generated);
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    /// Marched state at point `t`, for restarting.
    pub fn point(&self, t: usize) -> Option<BatteryPoint> {
        Some(BatteryPoint {
            energy: *self.energy.get(t)?,
            temperature: *self.temperature.get(t)?,
            charge_throughput: *self.charge_throughput.get(t)?,
        })
    }

    /// Write every series under the pack's own sub-tree.
    pub fn record(&self, scope: &mut Conditions) -> EnergyResult<()> {
        let n = self.len();
        for (key, values) in [
            ("energy", &self.energy),
            ("state_of_charge", &self.state_of_charge),
            ("temperature", &self.temperature),
            ("charge_throughput", &self.charge_throughput),
            ("voltage_open_circuit", &self.voltage_open_circuit),
            ("voltage_under_load", &self.voltage_under_load),
            ("cell_voltage_under_load", &self.cell_voltage_under_load),
            ("internal_resistance", &self.internal_resistance),
            ("current", &self.current),
            ("cell_current", &self.cell_current),
            ("power_draw", &self.power),
            ("heat_generated", &self.heat_generated),
        ] {
            scope.set_values(key, values)?;
        }
        scope.deep_set(
            "capacity_fade_factor",
            Series::filled(n, 1, self.capacity_fade_factor),
        )?;
        scope.deep_set(
            "resistance_growth_factor",
            Series::filled(n, 1, self.resistance_growth_factor),
        )?;
        Ok(())
    }
}

impl BatteryPoint {
    /// Initial state from the first row of a pack's sub-tree, falling back
    /// to `default` for anything not recorded yet.
    pub fn from_conditions(scope: Option<&Conditions>, default: BatteryPoint) -> Self {
        let first = |key: &str, fallback: f64| {
            scope
                .and_then(|s| s.deep_get(key).ok())
                .map(|s| s.first())
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };
        Self {
            energy: first("energy", default.energy),
            temperature: first("temperature", default.temperature),
            charge_throughput: first("charge_throughput", default.charge_throughput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{OpenCircuitModel, ResistanceModel};

    fn ideal_cell() -> Cell {
        Cell {
            nominal_voltage: 3.7,
            capacity: 100.0 / (3.7 * SECONDS_PER_HOUR),
            mass: 1.0,
            specific_heat: 1000.0,
            open_circuit: OpenCircuitModel::Polynomial {
                coefficients: vec![3.7],
            },
            resistance: ResistanceModel::Constant(0.0),
        }
    }

    #[test]
    fn simple_discharge_soc_sequence() {
        let pack = BatteryPack::new(ideal_cell(), 1, 1, None, ThermalModel::Isothermal).unwrap();
        assert!((pack.max_energy() - 100.0).abs() < 1e-9);
        let init = BatteryPoint {
            energy: pack.max_energy(),
            temperature: 300.0,
            charge_throughput: 0.0,
        };
        let h = pack
            .march(init, &[10.0; 5], &[0.0, 1.0, 2.0, 3.0, 4.0], &[300.0; 5])
            .unwrap();
        let expected = [1.0, 0.9, 0.8, 0.7, 0.6];
        for (soc, e) in h.state_of_charge.iter().zip(expected) {
            assert!((soc - e).abs() < 1e-12, "soc {soc} vs {e}");
        }
        assert!(h.charge_throughput.windows(2).all(|w| w[1] > w[0]));
        assert!(h.heat_generated.iter().all(|q| *q == 0.0));
    }

    #[test]
    fn current_root_matches_power() {
        let (v, r, p) = (400.0, 0.2, 50_000.0);
        let i = BatteryPack::current_for_power(p, v, r);
        assert!((v * i - r * i * i - p).abs() < 1e-6);
        // charging: terminal voltage rises above open circuit
        let i = BatteryPack::current_for_power(-5_000.0, v, r);
        assert!(i < 0.0 && v - i * r > v);
    }

    #[test]
    fn excess_power_caps_current() {
        let i = BatteryPack::current_for_power(1e9, 10.0, 1.0);
        assert_eq!(i, 5.0);
        assert_eq!(BatteryPack::current_for_power(100.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn depleted_pack_reports_zero_voltage() {
        let pack = BatteryPack::new(ideal_cell(), 1, 1, None, ThermalModel::Isothermal).unwrap();
        let init = BatteryPoint {
            energy: 15.0,
            temperature: 300.0,
            charge_throughput: 0.0,
        };
        let h = pack
            .march(init, &[10.0; 4], &[0.0, 1.0, 2.0, 3.0], &[300.0; 4])
            .unwrap();
        assert_eq!(h.energy, vec![15.0, 5.0, 0.0, 0.0]);
        assert_eq!(h.voltage_under_load[2], 0.0);
        assert_eq!(h.current[3], 0.0);
        assert!(h.state_of_charge.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn joule_heating_warms_lumped_pack() {
        let mut cell = ideal_cell();
        cell.resistance = ResistanceModel::Constant(0.05);
        cell.capacity = 10.0;
        let pack = BatteryPack::new(cell, 1, 1, None, ThermalModel::Lumped { conductance: 0.0 })
            .unwrap();
        let init = pack.initial_point(1.0, 300.0);
        let h = pack
            .march(init, &[20.0; 3], &[0.0, 10.0, 20.0], &[300.0; 3])
            .unwrap();
        assert!(h.temperature[2] > h.temperature[1] && h.temperature[1] > 300.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let pack = BatteryPack::new(ideal_cell(), 1, 1, None, ThermalModel::Isothermal).unwrap();
        let init = pack.initial_point(1.0, 300.0);
        assert!(matches!(
            pack.march(init, &[1.0; 3], &[0.0, 1.0], &[300.0; 3]),
            Err(EnergyError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn initial_point_from_recorded_rows() {
        let mut scope = Conditions::new();
        scope.set_values("energy", &[42.0, 41.0]).unwrap();
        let default = BatteryPoint {
            energy: 100.0,
            temperature: 300.0,
            charge_throughput: 0.5,
        };
        let p = BatteryPoint::from_conditions(Some(&scope), default);
        assert_eq!(p.energy, 42.0);
        assert_eq!(p.temperature, 300.0);
        assert_eq!(BatteryPoint::from_conditions(None, default), default);
    }
}
