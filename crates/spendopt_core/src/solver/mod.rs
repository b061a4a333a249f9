//! Constrained solver for budget allocation
//!
//! Solves the allocation problem
//!
//! ```text
//! maximize   sum_i (a_i * x_i - b_i * x_i^2)
//! subject to sum_i x_i = total_budget
//!            min_spend_i <= x_i <= max_spend_i
//! ```
//!
//! The objective is a sum of independent concave quadratics and every
//! constraint is linear, so the problem is convex and has a unique global
//! optimum; any correct method converges to it. The implementation in
//! [`qp`] bisects on the shared shadow price of the budget constraint.
//!
//! # Example
//!
//! ```ignore
//! use spendopt_core::{AllocationProblem, solver};
//!
//! let problem = AllocationProblem::new(channels, 50_000.0)?;
//! let (allocation, history) = solver::solve_with_history(&problem)?;
//! println!("converged in {} iterations", history.num_iterations());
//! ```

mod qp;
mod result;
mod tracker;
mod validate;

// Re-export public types
pub use result::{ConvergenceHistory, IterationRecord};
pub use tracker::ConvergenceTracker;
pub use validate::{DEFAULT_TOLERANCE, validate_allocation};

use crate::error::SolveError;
use crate::model::{Allocation, AllocationProblem};

/// Tuning knobs for the iterative solve
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Convergence tolerance on the objective value
    pub ftol: f64,
    /// Iteration ceiling; expiry surfaces as
    /// [`SolveError::OptimizationFailed`]
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            ftol: 1e-9,
            max_iterations: 100,
        }
    }
}

/// Solve the allocation problem, returning only the optimal allocation.
pub fn solve(problem: &AllocationProblem) -> Result<Allocation, SolveError> {
    solve_with_options(problem, &SolverOptions::default(), None)
}

/// Solve the allocation problem, also returning the per-iteration
/// convergence history for diagnostics or visualization.
pub fn solve_with_history(
    problem: &AllocationProblem,
) -> Result<(Allocation, ConvergenceHistory), SolveError> {
    let mut tracker = ConvergenceTracker::new(problem);
    let allocation = solve_with_options(problem, &SolverOptions::default(), Some(&mut tracker))?;
    Ok((allocation, tracker.into_history()))
}

/// Solve with explicit options and an optional iteration tracker.
///
/// The tracker is strictly passive: it records each iterate but never
/// influences the solver's control flow. After the numerical solve, the
/// candidate is re-checked by the independent [`validate_allocation`];
/// rejection despite solver success is an internal tolerance bug and
/// surfaces as [`SolveError::SolutionInvalid`].
pub fn solve_with_options(
    problem: &AllocationProblem,
    options: &SolverOptions,
    tracker: Option<&mut ConvergenceTracker>,
) -> Result<Allocation, SolveError> {
    let spends = qp::minimize(problem, options, tracker)?;

    let allocation = Allocation::from_spends(problem.channels(), &spends);

    if !validate_allocation(
        &allocation,
        problem.channels(),
        problem.total_budget(),
        DEFAULT_TOLERANCE,
    ) {
        return Err(SolveError::SolutionInvalid(
            "solver result violates budget or bound constraints".to_string(),
        ));
    }

    Ok(allocation)
}
