//! Marketing budget allocation library
//!
//! This crate models each advertising channel's conversions as a concave
//! quadratic function of spend and allocates a fixed total budget across
//! channels to maximize predicted conversions. It supports:
//! - Quadratic response curves with diminishing returns
//! - A constrained solver (budget equality + per-channel spend bounds)
//! - Per-iteration convergence tracking for diagnostics and visualization
//! - Independent solution validation against the original constraints
//! - Budget sweeps across multiple budget levels (parallel with the
//!   `parallel` feature)
//!
//! # Example
//!
//! ```ignore
//! use spendopt_core::{AllocationProblem, ChannelCurve, solver};
//!
//! let channels = vec![
//!     ChannelCurve::new("google", 0.001, 1e-8, 5_000.0, 30_000.0),
//!     ChannelCurve::new("meta", 0.0008, 8e-9, 3_000.0, 25_000.0),
//! ];
//! let problem = AllocationProblem::new(channels, 40_000.0)?;
//! let allocation = solver::solve(&problem)?;
//! println!("google spend: {:.2}", allocation.get("google").unwrap());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod curves;
pub mod error;
pub mod solver;
pub mod sweep;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{CurveError, SolveError};
pub use model::{Allocation, AllocationProblem, ChannelCurve};
pub use solver::{
    ConvergenceHistory, ConvergenceTracker, IterationRecord, SolverOptions, solve,
    solve_with_history,
};
pub use sweep::{BudgetPoint, solve_sweep};
