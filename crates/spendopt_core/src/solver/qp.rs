//! Shadow-price bisection for the allocation QP
//!
//! At the optimum every channel is either strictly interior to its bounds
//! with marginal return equal to a shared shadow price `lambda`, or pinned
//! to a bound. Given `lambda`, each channel's best spend is the clamp of
//! `(a_i - lambda) / (2 * b_i)` into `[min_spend_i, max_spend_i]`, and the
//! summed spend is monotone decreasing in `lambda`. Bisecting `lambda`
//! until the budget constraint holds therefore finds the unique global
//! optimum; a closed-form refinement over the stabilized active set removes
//! the remaining bisection error.

use super::SolverOptions;
use super::tracker::ConvergenceTracker;
use super::validate::DEFAULT_TOLERANCE;
use crate::error::SolveError;
use crate::model::{AllocationProblem, ChannelCurve};

/// Spend vector induced by a shadow price: per-channel unconstrained
/// optimum clamped into the channel's bounds.
fn spends_at_price(channels: &[ChannelCurve], lambda: f64) -> Vec<f64> {
    channels
        .iter()
        .map(|ch| {
            let raw = (ch.curve_a - lambda) / (2.0 * ch.curve_b);
            raw.clamp(ch.min_spend, ch.max_spend)
        })
        .collect()
}

/// Closed-form shadow price for the active set induced by `lambda`.
///
/// Channels whose unconstrained optimum falls outside their bounds are
/// frozen at the nearer bound; the interior channels share the budget
/// remainder at a common marginal return. Returns `None` when the active
/// set does not survive the refined price (bisection must continue) or
/// when every channel is pinned but the pinned total misses the budget.
fn refine_active_set(
    channels: &[ChannelCurve],
    total_budget: f64,
    lambda: f64,
) -> Option<(Vec<f64>, f64)> {
    let pattern = clamp_pattern(channels, lambda);

    let mut sum_ratio = 0.0; // sum of 1/(2b) over interior channels
    let mut sum_apex = 0.0; // sum of a/(2b) over interior channels
    let mut pinned_total = 0.0;

    for (ch, clamp) in channels.iter().zip(pattern.iter()) {
        match clamp {
            Clamp::Lower => pinned_total += ch.min_spend,
            Clamp::Upper => pinned_total += ch.max_spend,
            Clamp::Interior => {
                sum_ratio += 1.0 / (2.0 * ch.curve_b);
                sum_apex += ch.curve_a / (2.0 * ch.curve_b);
            }
        }
    }

    if sum_ratio == 0.0 {
        // Fully pinned: feasible only if the bounds happen to sum to the
        // budget (e.g. budget equals the sum of minimums).
        if (total_budget - pinned_total).abs() <= DEFAULT_TOLERANCE {
            return Some((spends_at_price(channels, lambda), lambda));
        }
        return None;
    }

    let refined_lambda = (sum_apex + pinned_total - total_budget) / sum_ratio;

    if clamp_pattern(channels, refined_lambda) != pattern {
        return None;
    }

    Some((spends_at_price(channels, refined_lambda), refined_lambda))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clamp {
    Lower,
    Interior,
    Upper,
}

fn clamp_pattern(channels: &[ChannelCurve], lambda: f64) -> Vec<Clamp> {
    channels
        .iter()
        .map(|ch| {
            let raw = (ch.curve_a - lambda) / (2.0 * ch.curve_b);
            if raw < ch.min_spend {
                Clamp::Lower
            } else if raw > ch.max_spend {
                Clamp::Upper
            } else {
                Clamp::Interior
            }
        })
        .collect()
}

/// Run the iterative solve, reporting each iterate to the tracker.
///
/// Returns the positional spend vector at the optimum.
pub(super) fn minimize(
    problem: &AllocationProblem,
    options: &SolverOptions,
    mut tracker: Option<&mut ConvergenceTracker>,
) -> Result<Vec<f64>, SolveError> {
    let channels = problem.channels();
    let total_budget = problem.total_budget();

    // The equality constraint is unreachable when even maxed-out channels
    // cannot absorb the budget. The analytic minimum-spend check lives in
    // AllocationProblem::new; this one is a solver-level non-success.
    let total_max: f64 = channels.iter().map(|ch| ch.max_spend).sum();
    if total_max < total_budget {
        return Err(SolveError::OptimizationFailed(format!(
            "budget {total_budget} exceeds total channel capacity {total_max}"
        )));
    }

    // Bracket the shadow price. At `price_lo` every channel sits at its
    // maximum (summed spend >= budget); at `price_hi` every channel sits at
    // its minimum (summed spend <= budget).
    let price_lo = channels
        .iter()
        .map(ChannelCurve::marginal_at_max)
        .fold(f64::INFINITY, f64::min);
    let price_hi = channels
        .iter()
        .map(|ch| ch.curve_a)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut lo = price_lo;
    let mut hi = price_hi;

    // Deterministic start: seed the first probe from the mean marginal
    // return at the max_spend-proportional initial iterate.
    let x0 = problem.initial_iterate();
    if let Some(t) = tracker.as_deref_mut() {
        t.observe(&x0);
    }
    let mean_marginal = channels
        .iter()
        .zip(x0.iter())
        .map(|(ch, &spend)| ch.marginal_at(spend))
        .sum::<f64>()
        / channels.len() as f64;
    let mut lambda = mean_marginal.clamp(lo, hi);

    let mut prev_objective = problem.objective(&x0);

    for _ in 0..options.max_iterations {
        let x = spends_at_price(channels, lambda);
        if let Some(t) = tracker.as_deref_mut() {
            t.observe(&x);
        }

        let objective = problem.objective(&x);
        let shortfall = problem.budget_residual(&x);

        // Summed spend decreases in lambda: a shortfall means the price is
        // too high.
        if shortfall > 0.0 {
            hi = lambda;
        } else {
            lo = lambda;
        }

        if let Some((refined, _)) = refine_active_set(channels, total_budget, lambda) {
            let refined_objective = problem.objective(&refined);
            let residual = problem.budget_residual(&refined);
            if residual.abs() <= DEFAULT_TOLERANCE
                && (refined_objective - prev_objective).abs() <= options.ftol
            {
                if let Some(t) = tracker.as_deref_mut() {
                    t.observe(&refined);
                }
                return Ok(refined);
            }
        }

        prev_objective = objective;
        lambda = f64::midpoint(lo, hi);
    }

    Err(SolveError::OptimizationFailed(format!(
        "did not converge within {} iterations",
        options.max_iterations
    )))
}
