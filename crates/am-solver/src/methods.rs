//! Newton and Broyden iterations with backtracking line search.

use crate::ResidualFn;
use crate::budget::{Evaluator, residual_norm};
use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use crate::settings::{SolveSettings, SolverMethod};
use nalgebra::{DMatrix, DVector};

/// Result of one solve.
#[derive(Clone, Debug)]
pub struct SolveOutcome {
    /// Best iterate found (lowest residual norm).
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub evaluations: usize,
    pub iterations: usize,
    pub converged: bool,
}

/// Pluggable nonlinear solver strategy.
pub trait NonlinearSolver {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        f: &mut ResidualFn<'_>,
        x0: DVector<f64>,
        settings: &SolveSettings,
    ) -> SolverResult<SolveOutcome>;
}

pub fn solver_for(method: SolverMethod) -> Box<dyn NonlinearSolver> {
    match method {
        SolverMethod::Newton => Box::new(Newton),
        SolverMethod::Broyden => Box::new(Broyden),
    }
}

/// Newton iteration with a finite-difference Jacobian at every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Newton;

/// Broyden's (good) method: one finite-difference Jacobian, then rank-1
/// updates; the Jacobian is rebuilt once when a step fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Broyden;

struct Iterate {
    x: DVector<f64>,
    r: DVector<f64>,
    norm: f64,
}

fn check_settings(settings: &SolveSettings) -> SolverResult<()> {
    if settings.max_evaluations == 0 {
        return Err(SolverError::InvalidArg {
            what: "max_evaluations must be at least 1",
        });
    }
    if !settings.tolerance.is_finite() || settings.tolerance <= 0.0 {
        return Err(SolverError::InvalidArg {
            what: "tolerance must be positive",
        });
    }
    if !settings.finite_difference_step.is_finite() || settings.finite_difference_step <= 0.0 {
        return Err(SolverError::InvalidArg {
            what: "finite difference step must be positive",
        });
    }
    if settings.line_search_beta.is_nan()
        || settings.line_search_beta <= 0.0
        || settings.line_search_beta >= 1.0
    {
        return Err(SolverError::InvalidArg {
            what: "line search factor must be in (0,1)",
        });
    }
    Ok(())
}

fn start(evaluator: &mut Evaluator<'_, '_>, x0: DVector<f64>) -> SolverResult<Iterate> {
    let r = evaluator.eval(&x0)?;
    let norm = residual_norm(&r);
    if !norm.is_finite() {
        tracing::warn!("non-finite residual at initial guess");
    }
    Ok(Iterate { x: x0, r, norm })
}

fn newton_step(jac: &DMatrix<f64>, r: &DVector<f64>) -> Option<DVector<f64>> {
    let dx = jac.clone().lu().solve(&(-r))?;
    dx.iter().all(|v| v.is_finite()).then_some(dx)
}

/// Backtrack along `dx` until the residual norm decreases.
fn line_search(
    evaluator: &mut Evaluator<'_, '_>,
    current: &Iterate,
    dx: &DVector<f64>,
    settings: &SolveSettings,
) -> SolverResult<Option<Iterate>> {
    let mut alpha = 1.0;
    for _ in 0..settings.max_line_search_iters.max(1) {
        if !evaluator.can_afford(1) {
            return Ok(None);
        }
        let x = &current.x + alpha * dx;
        let r = evaluator.eval(&x)?;
        let norm = residual_norm(&r);
        if norm < current.norm {
            return Ok(Some(Iterate { x, r, norm }));
        }
        alpha *= settings.line_search_beta;
    }
    Ok(None)
}

fn finish(state: Iterate, evaluator: &Evaluator<'_, '_>, iterations: usize, tol: f64) -> SolveOutcome {
    SolveOutcome {
        converged: state.norm < tol,
        residual_norm: state.norm,
        x: state.x,
        evaluations: evaluator.evaluations(),
        iterations,
    }
}

impl NonlinearSolver for Newton {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn solve(
        &self,
        f: &mut ResidualFn<'_>,
        x0: DVector<f64>,
        settings: &SolveSettings,
    ) -> SolverResult<SolveOutcome> {
        check_settings(settings)?;
        let n = x0.len();
        let mut evaluator = Evaluator::new(f, settings.max_evaluations, n);
        let mut state = start(&mut evaluator, x0)?;
        let mut iterations = 0;

        while state.norm >= settings.tolerance {
            if !evaluator.can_afford(n + 1) {
                tracing::debug!(evaluations = evaluator.evaluations(), "evaluation budget exhausted");
                break;
            }
            if !state.norm.is_finite() {
                break;
            }
            let jac = finite_difference_jacobian(
                &mut evaluator,
                &state.x,
                &state.r,
                settings.finite_difference_step,
            )?;
            let Some(dx) = newton_step(&jac, &state.r) else {
                tracing::debug!(iterations, "singular Jacobian");
                break;
            };
            match line_search(&mut evaluator, &state, &dx, settings)? {
                Some(next) => state = next,
                None => {
                    tracing::debug!(iterations, "line search stagnated");
                    break;
                }
            }
            iterations += 1;
            tracing::debug!(iterations, residual_norm = state.norm, "newton iteration");
        }

        Ok(finish(state, &evaluator, iterations, settings.tolerance))
    }
}

impl NonlinearSolver for Broyden {
    fn name(&self) -> &'static str {
        "broyden"
    }

    fn solve(
        &self,
        f: &mut ResidualFn<'_>,
        x0: DVector<f64>,
        settings: &SolveSettings,
    ) -> SolverResult<SolveOutcome> {
        check_settings(settings)?;
        let n = x0.len();
        let mut evaluator = Evaluator::new(f, settings.max_evaluations, n);
        let mut state = start(&mut evaluator, x0)?;
        let mut iterations = 0;
        let mut jacobian: Option<DMatrix<f64>> = None;

        while state.norm >= settings.tolerance && state.norm.is_finite() {
            let (jac, fresh) = match jacobian.take() {
                Some(j) => (j, false),
                None => {
                    if !evaluator.can_afford(n + 1) {
                        tracing::debug!(evaluations = evaluator.evaluations(), "evaluation budget exhausted");
                        break;
                    }
                    let j = finite_difference_jacobian(
                        &mut evaluator,
                        &state.x,
                        &state.r,
                        settings.finite_difference_step,
                    )?;
                    (j, true)
                }
            };

            let step = newton_step(&jac, &state.r);
            let next = match &step {
                Some(dx) => line_search(&mut evaluator, &state, dx, settings)?,
                None => None,
            };
            let Some(next) = next else {
                if fresh || !evaluator.can_afford(1) {
                    tracing::debug!(iterations, "broyden step failed");
                    break;
                }
                // Retry from a rebuilt Jacobian.
                continue;
            };

            let s = &next.x - &state.x;
            let y = &next.r - &state.r;
            let ss = s.dot(&s);
            let mut updated = jac;
            if ss > 0.0 {
                let correction = (&y - &updated * &s) * s.transpose() / ss;
                updated += correction;
            }
            jacobian = Some(updated);
            state = next;
            iterations += 1;
            tracing::debug!(iterations, residual_norm = state.norm, "broyden iteration");
        }

        Ok(finish(state, &evaluator, iterations, settings.tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
    }

    fn circle_line(x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_vec(vec![
            x[0] * x[0] + x[1] * x[1] - 4.0,
            x[0] - x[1],
        ]))
    }

    #[test]
    fn newton_simple_quadratic() {
        let mut f = quadratic;
        let out = Newton
            .solve(&mut f, DVector::from_element(1, 3.0), &SolveSettings::default())
            .unwrap();
        assert!(out.converged);
        assert!((out.x[0] - 2.0).abs() < 1e-6);
        assert!(out.evaluations > 1);
    }

    #[test]
    fn newton_two_by_two() {
        let mut f = circle_line;
        let out = Newton
            .solve(&mut f, DVector::from_vec(vec![1.0, 0.5]), &SolveSettings::default())
            .unwrap();
        assert!(out.converged);
        let root = 2.0_f64.sqrt();
        assert!((out.x[0] - root).abs() < 1e-6);
        assert!((out.x[1] - root).abs() < 1e-6);
    }

    #[test]
    fn broyden_two_by_two() {
        let mut f = circle_line;
        let settings = SolveSettings {
            method: SolverMethod::Broyden,
            ..SolveSettings::default()
        };
        let out = solver_for(settings.method)
            .solve(&mut f, DVector::from_vec(vec![1.0, 0.5]), &settings)
            .unwrap();
        assert!(out.converged);
        assert!((out.x[0] - 2.0_f64.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn budget_exhaustion_is_not_an_error() {
        let mut f = quadratic;
        let out = Newton
            .solve(&mut f, DVector::from_element(1, 3.0), &SolveSettings::with_budget(1))
            .unwrap();
        assert!(!out.converged);
        assert_eq!(out.evaluations, 1);
        assert_eq!(out.x[0], 3.0);
        assert!((out.residual_norm - 5.0).abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_reports_failure() {
        let mut f = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 1.0))
        };
        let out = Newton
            .solve(&mut f, DVector::from_element(1, 0.0), &SolveSettings::default())
            .unwrap();
        assert!(!out.converged);
        assert_eq!(out.residual_norm, 1.0);
    }

    #[test]
    fn evaluation_errors_propagate() {
        let mut f = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Err(SolverError::Evaluation {
                what: "boom".to_string(),
            })
        };
        let result = Newton.solve(&mut f, DVector::from_element(1, 0.0), &SolveSettings::default());
        assert!(matches!(result, Err(SolverError::Evaluation { .. })));
    }

    #[test]
    fn zero_budget_rejected() {
        let mut f = quadratic;
        let settings = SolveSettings::with_budget(0);
        assert!(Newton.solve(&mut f, DVector::from_element(1, 3.0), &settings).is_err());
    }
}
