//! Tabulated cell discharge performance.
//!
//! A regular grid over (cell current, cell temperature, state of charge)
//! holding the loaded cell voltage and the resulting cell temperature.
//! Lookups interpolate trilinearly and clamp at the grid edges, so a solver
//! iterate outside the tested envelope still gets a finite answer.

use std::fs;
use std::path::Path;

use am_core::numeric::{Bracket, bracket, is_strictly_increasing, lerp};
use serde::{Deserialize, Serialize};

use crate::error::{EnergyError, EnergyResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DischargeMap {
    /// Cell current axis, A.
    pub current: Vec<f64>,
    /// Cell temperature axis, K.
    pub temperature: Vec<f64>,
    /// State-of-charge axis, [0, 1].
    pub state_of_charge: Vec<f64>,
    /// Loaded cell voltage, indexed `(i_current * n_temperature + j) * n_soc + k`.
    pub voltage: Vec<f64>,
    /// Cell temperature after the discharge step, same layout as `voltage`.
    pub cell_temperature: Vec<f64>,
}

impl DischargeMap {
    pub fn new(
        current: Vec<f64>,
        temperature: Vec<f64>,
        state_of_charge: Vec<f64>,
        voltage: Vec<f64>,
        cell_temperature: Vec<f64>,
    ) -> EnergyResult<Self> {
        let map = Self {
            current,
            temperature,
            state_of_charge,
            voltage,
            cell_temperature,
        };
        map.validate()?;
        Ok(map)
    }

    /// Tabulate `f(current, temperature, soc) -> (voltage, temperature)` on a grid.
    pub fn from_fn(
        current: Vec<f64>,
        temperature: Vec<f64>,
        state_of_charge: Vec<f64>,
        f: impl Fn(f64, f64, f64) -> (f64, f64),
    ) -> EnergyResult<Self> {
        let mut voltage = Vec::with_capacity(current.len() * temperature.len() * state_of_charge.len());
        let mut cell_temperature = Vec::with_capacity(voltage.capacity());
        for &i in &current {
            for &t in &temperature {
                for &s in &state_of_charge {
                    let (v, temp) = f(i, t, s);
                    voltage.push(v);
                    cell_temperature.push(temp);
                }
            }
        }
        Self::new(current, temperature, state_of_charge, voltage, cell_temperature)
    }

    pub fn validate(&self) -> EnergyResult<()> {
        for (axis, what) in [
            (&self.current, "current axis must be strictly increasing"),
            (&self.temperature, "temperature axis must be strictly increasing"),
            (&self.state_of_charge, "soc axis must be strictly increasing"),
        ] {
            if axis.is_empty() || !is_strictly_increasing(axis) {
                return Err(EnergyError::InvalidArg { what });
            }
        }
        let expected = self.current.len() * self.temperature.len() * self.state_of_charge.len();
        for (values, what) in [
            (&self.voltage, "discharge map voltage"),
            (&self.cell_temperature, "discharge map temperature"),
        ] {
            if values.len() != expected {
                return Err(EnergyError::LengthMismatch {
                    what,
                    expected,
                    found: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(EnergyError::NonPhysical { what });
            }
        }
        Ok(())
    }

    fn flat(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.temperature.len() + j) * self.state_of_charge.len() + k
    }

    fn trilinear(&self, values: &[f64], current: f64, temperature: f64, soc: f64) -> EnergyResult<f64> {
        let bi: Bracket = bracket(&self.current, current)?;
        let bj = bracket(&self.temperature, temperature)?;
        let bk = bracket(&self.state_of_charge, soc)?;

        let along_soc = |i: usize, j: usize| {
            lerp(
                values[self.flat(i, j, bk.lo)],
                values[self.flat(i, j, bk.hi)],
                bk.t,
            )
        };
        let along_temp = |i: usize| lerp(along_soc(i, bj.lo), along_soc(i, bj.hi), bj.t);
        Ok(lerp(along_temp(bi.lo), along_temp(bi.hi), bi.t))
    }

    /// Loaded cell voltage, V.
    pub fn voltage_at(&self, current: f64, temperature: f64, soc: f64) -> EnergyResult<f64> {
        self.trilinear(&self.voltage, current, temperature, soc)
    }

    /// Cell temperature, K.
    pub fn temperature_at(&self, current: f64, temperature: f64, soc: f64) -> EnergyResult<f64> {
        self.trilinear(&self.cell_temperature, current, temperature, soc)
    }

    pub fn save(&self, path: &Path) -> EnergyResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| EnergyError::Io {
            message: format!("serialize discharge map: {e}"),
        })?;
        fs::write(path, json).map_err(|e| EnergyError::Io {
            message: format!("write {}: {e}", path.display()),
        })
    }

    pub fn load(path: &Path) -> EnergyResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| EnergyError::Io {
            message: format!("read {}: {e}", path.display()),
        })?;
        let map: Self = serde_json::from_str(&json).map_err(|e| EnergyError::Io {
            message: format!("parse {}: {e}", path.display()),
        })?;
        map.validate()?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(i: f64, t: f64, s: f64) -> (f64, f64) {
        (3.0 + 1.2 * s - 0.01 * i + 0.001 * (t - 298.0), t + 0.5 * i)
    }

    fn sample() -> DischargeMap {
        DischargeMap::from_fn(
            vec![0.0, 5.0, 10.0],
            vec![273.0, 298.0, 323.0],
            vec![0.0, 0.5, 1.0],
            plane,
        )
        .unwrap()
    }

    #[test]
    fn reproduces_linear_field_between_nodes() {
        let map = sample();
        let (v, t) = plane(2.5, 310.0, 0.3);
        assert!((map.voltage_at(2.5, 310.0, 0.3).unwrap() - v).abs() < 1e-12);
        assert!((map.temperature_at(2.5, 310.0, 0.3).unwrap() - t).abs() < 1e-9);
    }

    #[test]
    fn clamps_outside_grid() {
        let map = sample();
        let edge = map.voltage_at(10.0, 323.0, 1.0).unwrap();
        assert_eq!(map.voltage_at(50.0, 400.0, 2.0).unwrap(), edge);
    }

    #[test]
    fn rejects_bad_axes() {
        let err = DischargeMap::new(vec![1.0, 0.0], vec![300.0], vec![0.5], vec![3.0; 2], vec![300.0; 2]);
        assert!(matches!(err, Err(EnergyError::InvalidArg { .. })));
        let err = DischargeMap::new(vec![0.0], vec![300.0], vec![0.5], vec![3.0; 2], vec![300.0]);
        assert!(matches!(err, Err(EnergyError::LengthMismatch { .. })));
    }
}
