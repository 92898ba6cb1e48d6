//! Single-cell electrical models.

use am_core::constants::SECONDS_PER_HOUR;

use crate::common::{EPSILON_VOLTAGE, check_positive};
use crate::discharge_map::DischargeMap;
use crate::error::{EnergyError, EnergyResult};

/// Open-circuit voltage as a function of state of charge.
#[derive(Clone, Debug, PartialEq)]
pub enum OpenCircuitModel {
    /// Coefficients in ascending powers of SOC.
    Polynomial { coefficients: Vec<f64> },
    /// Loaded voltage looked up from a discharge map; the open-circuit
    /// value is the zero-current column.
    Map(DischargeMap),
}

/// Internal resistance of one cell, ohm.
#[derive(Clone, Debug, PartialEq)]
pub enum ResistanceModel {
    Constant(f64),
    /// `c0 + c1·SOC + c2·SOC²`
    SocQuadratic { c0: f64, c1: f64, c2: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub nominal_voltage: f64,
    /// Rated capacity, A·h.
    pub capacity: f64,
    /// kg
    pub mass: f64,
    /// J/(kg K)
    pub specific_heat: f64,
    pub open_circuit: OpenCircuitModel,
    pub resistance: ResistanceModel,
}

impl Cell {
    /// Cylindrical 18650 NMC cell.
    pub fn nmc_18650() -> Self {
        Self {
            nominal_voltage: 3.6,
            capacity: 3.0,
            mass: 0.048,
            specific_heat: 1_108.0,
            open_circuit: OpenCircuitModel::Polynomial {
                coefficients: vec![3.0, 1.7, -1.6, 1.1],
            },
            resistance: ResistanceModel::SocQuadratic {
                c0: 0.1036,
                c1: -0.02518,
                c2: 0.01483,
            },
        }
    }

    pub fn validate(&self) -> EnergyResult<()> {
        check_positive(self.nominal_voltage, "cell nominal voltage")?;
        check_positive(self.capacity, "cell capacity")?;
        check_positive(self.mass, "cell mass")?;
        check_positive(self.specific_heat, "cell specific heat")?;
        match &self.open_circuit {
            OpenCircuitModel::Polynomial { coefficients } => {
                if coefficients.is_empty() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(EnergyError::InvalidArg {
                        what: "open-circuit polynomial",
                    });
                }
            }
            OpenCircuitModel::Map(map) => map.validate()?,
        }
        let r = match self.resistance {
            ResistanceModel::Constant(r) => r,
            ResistanceModel::SocQuadratic { c0, c1, c2 } => c0.min(c0 + c1 + c2),
        };
        if !r.is_finite() || r < 0.0 {
            return Err(EnergyError::InvalidArg {
                what: "cell resistance must be non-negative",
            });
        }
        Ok(())
    }

    /// Rated energy, J.
    pub fn nominal_energy(&self) -> f64 {
        self.nominal_voltage * self.capacity * SECONDS_PER_HOUR
    }

    pub fn discharge_map(&self) -> Option<&DischargeMap> {
        match &self.open_circuit {
            OpenCircuitModel::Map(map) => Some(map),
            OpenCircuitModel::Polynomial { .. } => None,
        }
    }

    pub fn open_circuit_voltage(&self, soc: f64, temperature: f64) -> EnergyResult<f64> {
        match &self.open_circuit {
            OpenCircuitModel::Polynomial { coefficients } => Ok(coefficients
                .iter()
                .rev()
                .fold(0.0, |acc, c| acc * soc + c)),
            OpenCircuitModel::Map(map) => map.voltage_at(0.0, temperature, soc),
        }
    }

    pub fn internal_resistance(&self, soc: f64) -> f64 {
        let r = match self.resistance {
            ResistanceModel::Constant(r) => r,
            ResistanceModel::SocQuadratic { c0, c1, c2 } => c0 + c1 * soc + c2 * soc * soc,
        };
        r.max(0.0)
    }

    /// Cell current delivering `power` (W) at the map's loaded voltage,
    /// by fixed-point substitution `I = P / V(I)`.
    pub fn map_current(
        map: &DischargeMap,
        power: f64,
        temperature: f64,
        soc: f64,
        guess_voltage: f64,
    ) -> EnergyResult<(f64, f64)> {
        const MAX_ITERATIONS: usize = 30;
        let mut current = power / guess_voltage.max(EPSILON_VOLTAGE);
        let mut voltage = map.voltage_at(current, temperature, soc)?;
        for _ in 0..MAX_ITERATIONS {
            if voltage < EPSILON_VOLTAGE {
                return Ok((0.0, 0.0));
            }
            let next = power / voltage;
            let converged = (next - current).abs() <= 1e-10 * (1.0 + current.abs());
            current = next;
            voltage = map.voltage_at(current, temperature, soc)?;
            if converged {
                break;
            }
        }
        Ok((current, voltage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_ocv_spans_cell_window() {
        let cell = Cell::nmc_18650();
        assert!((cell.open_circuit_voltage(0.0, 298.0).unwrap() - 3.0).abs() < 1e-12);
        assert!((cell.open_circuit_voltage(1.0, 298.0).unwrap() - 4.2).abs() < 1e-12);
        let mut last = 0.0;
        for i in 0..=20 {
            let v = cell.open_circuit_voltage(i as f64 / 20.0, 298.0).unwrap();
            assert!(v > last);
            last = v;
        }
    }

    #[test]
    fn resistance_correlation() {
        let cell = Cell::nmc_18650();
        let r_full = cell.internal_resistance(1.0);
        assert!((r_full - (0.1036 - 0.02518 + 0.01483)).abs() < 1e-15);
        assert!(cell.internal_resistance(0.0) > r_full);
    }

    #[test]
    fn map_current_solves_power_balance() {
        let map = DischargeMap::from_fn(
            vec![0.0, 10.0, 20.0],
            vec![250.0, 350.0],
            vec![0.0, 1.0],
            |i, t, s| (3.2 + 0.8 * s - 0.02 * i, t),
        )
        .unwrap();
        let (i, v) = Cell::map_current(&map, 30.0, 300.0, 0.5, 3.6).unwrap();
        assert!((i * v - 30.0).abs() < 1e-6);
    }

    #[test]
    fn validate_rejects_bad_cells() {
        let mut cell = Cell::nmc_18650();
        cell.capacity = 0.0;
        assert!(cell.validate().is_err());
        let mut cell = Cell::nmc_18650();
        cell.resistance = ResistanceModel::Constant(-1.0);
        assert!(cell.validate().is_err());
    }
}
