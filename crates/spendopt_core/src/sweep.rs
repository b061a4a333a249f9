//! Budget sweeps: solve the same channel set across many budget levels
//!
//! Produces the budget/conversions frontier consumed by external reporting
//! and visualization layers. Each budget level is an independent solve with
//! its own working state, so the sweep parallelizes trivially; with the
//! `parallel` feature (default) the levels run on a rayon pool.

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::SolveError;
use crate::model::{Allocation, AllocationProblem, ChannelCurve};
use crate::solver;

/// One point on the budget/conversions frontier
#[derive(Debug, Clone, serde::Serialize)]
pub struct BudgetPoint {
    pub budget: f64,
    pub total_conversions: f64,
    pub allocation: Allocation,
}

fn solve_one(channels: &[ChannelCurve], budget: f64) -> Result<BudgetPoint, SolveError> {
    let problem = AllocationProblem::new(channels.to_vec(), budget)?;
    let allocation = solver::solve(&problem)?;

    let total_conversions = channels
        .iter()
        .map(|ch| ch.conversions_at(allocation.get(&ch.channel).unwrap_or(0.0)))
        .sum();

    Ok(BudgetPoint {
        budget,
        total_conversions,
        allocation,
    })
}

/// Solve one allocation problem per budget level, in input order.
///
/// Fails on the first level whose problem is malformed or infeasible; a
/// sweep that silently skipped levels would misalign the frontier.
pub fn solve_sweep(
    channels: &[ChannelCurve],
    budgets: &[f64],
) -> Result<Vec<BudgetPoint>, SolveError> {
    #[cfg(feature = "parallel")]
    let points: Result<Vec<_>, _> = budgets
        .par_iter()
        .map(|&budget| solve_one(channels, budget))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let points: Result<Vec<_>, _> = budgets
        .iter()
        .map(|&budget| solve_one(channels, budget))
        .collect();

    points
}

/// Evenly spaced budget levels from `lo` to `hi` inclusive.
#[must_use]
pub fn budget_levels(lo: f64, hi: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![lo];
    }
    let span = hi - lo;
    (0..steps)
        .map(|i| lo + span * i as f64 / (steps - 1) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_channels() -> Vec<ChannelCurve> {
        vec![
            ChannelCurve::new("google", 0.001, 1e-8, 5_000.0, 30_000.0),
            ChannelCurve::new("meta", 0.0008, 8e-9, 3_000.0, 25_000.0),
            ChannelCurve::new("tiktok", 0.0006, 6e-9, 2_000.0, 20_000.0),
        ]
    }

    #[test]
    fn test_budget_levels_spacing() {
        let levels = budget_levels(10_000.0, 50_000.0, 5);
        assert_eq!(levels.len(), 5);
        assert!((levels[0] - 10_000.0).abs() < 1e-9);
        assert!((levels[2] - 30_000.0).abs() < 1e-9);
        assert!((levels[4] - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_preserves_order_and_feasibility() {
        let channels = test_channels();
        let budgets = budget_levels(20_000.0, 60_000.0, 5);

        let points = solve_sweep(&channels, &budgets).unwrap();

        assert_eq!(points.len(), budgets.len());
        for (point, &budget) in points.iter().zip(budgets.iter()) {
            assert!((point.budget - budget).abs() < 1e-12);
            assert!((point.allocation.total_spend() - budget).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sweep_conversions_monotone_in_budget() {
        // With positive marginal return everywhere below max, more budget
        // can only buy more conversions.
        let channels = test_channels();
        let budgets = budget_levels(15_000.0, 55_000.0, 9);

        let points = solve_sweep(&channels, &budgets).unwrap();
        for pair in points.windows(2) {
            assert!(pair[1].total_conversions >= pair[0].total_conversions - 1e-9);
        }
    }

    #[test]
    fn test_sweep_fails_on_infeasible_level() {
        let channels = test_channels();
        // Minimums sum to 10_000
        let err = solve_sweep(&channels, &[9_000.0]).unwrap_err();
        assert!(matches!(err, SolveError::Infeasible { .. }));
    }
}
