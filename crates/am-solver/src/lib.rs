//! Nonlinear solvers for segment residual systems.
//!
//! A segment flattens its unknowns into one vector and hands the solver a
//! residual closure. Solvers are strategies behind [`NonlinearSolver`];
//! every call counts against an evaluation budget, and running out of
//! budget is reported through [`SolveOutcome::converged`], never as an
//! error.

pub mod budget;
pub mod error;
pub mod jacobian;
pub mod methods;
pub mod settings;

pub use budget::Evaluator;
pub use error::{SolverError, SolverResult};
pub use methods::{Broyden, Newton, NonlinearSolver, SolveOutcome, solver_for};
pub use settings::{SolveSettings, SolverMethod};

/// Residual closure handed to a solver.
pub type ResidualFn<'a> =
    dyn FnMut(&nalgebra::DVector<f64>) -> SolverResult<nalgebra::DVector<f64>> + 'a;
