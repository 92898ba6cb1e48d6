//! Solver configuration.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    #[default]
    Newton,
    Broyden,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveSettings {
    pub method: SolverMethod,
    /// Maximum residual evaluations, Jacobian columns included.
    pub max_evaluations: usize,
    /// Converged when the residual 2-norm drops below this.
    pub tolerance: f64,
    /// Relative finite-difference step.
    pub finite_difference_step: f64,
    /// Line search backtracking factor.
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            method: SolverMethod::Newton,
            max_evaluations: 2000,
            tolerance: 1e-6,
            finite_difference_step: 1e-7,
            line_search_beta: 0.5,
            max_line_search_iters: 12,
        }
    }
}

impl SolveSettings {
    pub fn with_budget(max_evaluations: usize) -> Self {
        Self {
            max_evaluations,
            ..Self::default()
        }
    }
}
