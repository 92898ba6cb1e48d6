//! Chebyshev-Gauss-Lobatto discretization of a segment.
//!
//! Control points on the unit interval:
//!
//! ```text
//! x_i  = ½(1 − cos(π i/(n−1)))
//! D_ij = (c_i/c_j)(−1)^(i+j)/(x_i − x_j),   c = [2, 1, …, 1, 2]
//! D_ii = −Σ_{j≠i} D_ij
//! ```
//!
//! The integration operator is the inverse of `D` with the first row and
//! column removed, padded so the integral is zero at the first point.
//! Physical operators divide (differentiate) or multiply (integrate) by the
//! segment duration.

use crate::error::{MissionError, MissionResult};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
    /// Control points in [0, 1], ascending.
    pub points: Vec<f64>,
    pub differentiation: DMatrix<f64>,
    pub integration: DMatrix<f64>,
}

impl Discretization {
    pub fn chebyshev(n: usize) -> MissionResult<Self> {
        if n < 2 {
            return Err(MissionError::InvalidArg {
                what: "at least two control points",
            });
        }
        let last = (n - 1) as f64;
        let points: Vec<f64> = (0..n)
            .map(|i| 0.5 * (1.0 - (PI * i as f64 / last).cos()))
            .collect();
        let weight = |i: usize| {
            let c = if i == 0 || i == n - 1 { 2.0 } else { 1.0 };
            if i % 2 == 0 { c } else { -c }
        };

        let mut d = DMatrix::zeros(n, n);
        for i in 0..n {
            let mut row_sum = 0.0;
            for j in 0..n {
                if i != j {
                    let v = weight(i) / weight(j) / (points[i] - points[j]);
                    d[(i, j)] = v;
                    row_sum += v;
                }
            }
            d[(i, i)] = -row_sum;
        }

        let inner = d.view((1, 1), (n - 1, n - 1)).clone_owned();
        let inverse = inner.try_inverse().ok_or(MissionError::NonPhysical {
            what: "singular differentiation operator",
        })?;
        let mut integration = DMatrix::zeros(n, n);
        integration
            .view_mut((1, 1), (n - 1, n - 1))
            .copy_from(&inverse);

        Ok(Self {
            points,
            differentiation: d,
            integration,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time at each control point for a segment starting at `start`.
    pub fn time_grid(&self, start: f64, duration: f64) -> Vec<f64> {
        self.points.iter().map(|x| start + x * duration).collect()
    }

    /// d/dt of `values` over a segment of length `duration`.
    pub fn differentiate(&self, values: &[f64], duration: f64) -> Vec<f64> {
        let v = DVector::from_column_slice(values);
        let scale = if duration.abs() > am_core::DIVISOR_FLOOR {
            1.0 / duration
        } else {
            0.0
        };
        (&self.differentiation * v * scale).as_slice().to_vec()
    }

    /// Running integral of `values` from the first point.
    pub fn integrate(&self, values: &[f64], duration: f64) -> Vec<f64> {
        let v = DVector::from_column_slice(values);
        (&self.integration * v * duration).as_slice().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_ordering() {
        let d = Discretization::chebyshev(8).unwrap();
        assert_eq!(d.points[0], 0.0);
        assert!((d.points[7] - 1.0).abs() < 1e-15);
        assert!(d.points.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn differentiates_cubic_exactly() {
        let d = Discretization::chebyshev(6).unwrap();
        let duration = 4.0;
        let t = d.time_grid(0.0, duration);
        let f: Vec<f64> = t.iter().map(|t| t * t * t - 2.0 * t).collect();
        let df = d.differentiate(&f, duration);
        for (ti, dfi) in t.iter().zip(&df) {
            assert!((dfi - (3.0 * ti * ti - 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn integrates_quadratic_exactly() {
        let d = Discretization::chebyshev(5).unwrap();
        let duration = 2.0;
        let t = d.time_grid(0.0, duration);
        let f: Vec<f64> = t.iter().map(|t| 3.0 * t * t).collect();
        let integral = d.integrate(&f, duration);
        assert_eq!(integral[0], 0.0);
        for (ti, ii) in t.iter().zip(&integral) {
            assert!((ii - ti * ti * ti).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_has_zero_derivative() {
        let d = Discretization::chebyshev(16).unwrap();
        let df = d.differentiate(&[3.0; 16], 10.0);
        assert!(df.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn single_point_rejected() {
        assert!(Discretization::chebyshev(1).is_err());
    }
}
