//! Evaluation counting around a residual closure.

use crate::ResidualFn;
use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

pub struct Evaluator<'f, 'a> {
    f: &'f mut ResidualFn<'a>,
    evaluations: usize,
    limit: usize,
    dimension: usize,
}

impl<'f, 'a> Evaluator<'f, 'a> {
    pub fn new(f: &'f mut ResidualFn<'a>, limit: usize, dimension: usize) -> Self {
        Self {
            f,
            evaluations: 0,
            limit,
            dimension,
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.evaluations)
    }

    pub fn can_afford(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Evaluate the residual and check its length.
    pub fn eval(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.evaluations += 1;
        let r = (self.f)(x)?;
        if r.len() != self.dimension {
            return Err(SolverError::DimensionMismatch {
                expected: self.dimension,
                found: r.len(),
            });
        }
        Ok(r)
    }
}

/// 2-norm, infinite when any entry is non-finite.
pub fn residual_norm(r: &DVector<f64>) -> f64 {
    if r.iter().all(|v| v.is_finite()) {
        r.norm()
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_checks_length() {
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.clone()) };
        let mut ev = Evaluator::new(&mut f, 2, 1);
        assert!(ev.eval(&DVector::from_element(1, 1.0)).is_ok());
        assert_eq!(ev.remaining(), 1);
        assert!(ev.eval(&DVector::from_element(2, 1.0)).is_err());
        assert_eq!(ev.evaluations(), 2);
        assert!(!ev.can_afford(1));
    }

    #[test]
    fn non_finite_norm_is_infinite() {
        let r = DVector::from_vec(vec![1.0, f64::NAN]);
        assert_eq!(residual_norm(&r), f64::INFINITY);
    }
}
