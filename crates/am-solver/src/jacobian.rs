//! Finite difference Jacobian computation.

use crate::budget::Evaluator;
use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Forward-difference Jacobian at `x` given `f_x = f(x)`.
///
/// Costs one evaluation per column.
pub fn finite_difference_jacobian(
    evaluator: &mut Evaluator<'_, '_>,
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>> {
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let f_perturbed = evaluator.eval(&x_perturbed)?;
        let df = (f_perturbed - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResidualFn;

    #[test]
    fn jacobian_quadratic() {
        let mut f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
        };
        let f: &mut ResidualFn<'_> = &mut f;
        let mut ev = Evaluator::new(f, 10, 2);
        let x = DVector::from_vec(vec![3.0, 2.0]);
        let fx = ev.eval(&x).unwrap();
        let jac = finite_difference_jacobian(&mut ev, &x, &fx, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
        assert!(jac[(0, 1)].abs() < 1e-5);
        assert!((jac[(1, 0)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
        assert_eq!(ev.evaluations(), 3);
    }
}
