//! Data model for allocation problems and their solutions

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::curves;
use crate::error::SolveError;

/// One advertising channel's performance model: a quadratic response curve
/// plus per-channel spend bounds.
///
/// Immutable for the duration of a solve; the solver never mutates it.
/// Callers are expected to supply coefficients with diminishing but still
/// positive marginal return at `max_spend` (see [`marginal_at_max`]); the
/// solver does not enforce that itself.
///
/// [`marginal_at_max`]: ChannelCurve::marginal_at_max
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCurve {
    /// Unique channel identifier
    pub channel: String,
    /// Initial marginal conversions per unit spend (> 0)
    pub curve_a: f64,
    /// Curvature / saturation coefficient (> 0)
    pub curve_b: f64,
    /// Lower spend bound (>= 0)
    pub min_spend: f64,
    /// Upper spend bound (> `min_spend`)
    pub max_spend: f64,
}

impl ChannelCurve {
    pub fn new(
        channel: impl Into<String>,
        curve_a: f64,
        curve_b: f64,
        min_spend: f64,
        max_spend: f64,
    ) -> Self {
        Self {
            channel: channel.into(),
            curve_a,
            curve_b,
            min_spend,
            max_spend,
        }
    }

    /// Predicted conversions at a spend level on this channel's curve.
    #[must_use]
    pub fn conversions_at(&self, spend: f64) -> f64 {
        curves::conversions(spend, self.curve_a, self.curve_b)
    }

    /// Marginal conversions per additional dollar at a spend level.
    #[must_use]
    pub fn marginal_at(&self, spend: f64) -> f64 {
        curves::marginal(spend, self.curve_a, self.curve_b)
    }

    /// Marginal return at the upper spend bound. Negative values mean the
    /// curve peaks inside the spend range, which downstream validation or
    /// reporting may want to flag.
    #[must_use]
    pub fn marginal_at_max(&self) -> f64 {
        self.marginal_at(self.max_spend)
    }
}

/// A complete allocation problem: the channel curves plus the total budget
/// that must be spent exactly.
///
/// Construction performs all eager input checks, so a successfully built
/// problem is well-formed and feasible-by-minimums. Each solve call owns its
/// own problem value; nothing here is shared mutable state, so independent
/// solves are safe to run concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationProblem {
    channels: Vec<ChannelCurve>,
    total_budget: f64,
}

impl AllocationProblem {
    /// Build a problem, validating inputs up front.
    ///
    /// # Errors
    /// - [`SolveError::InvalidInput`] for an empty channel set, a
    ///   non-positive budget, non-positive curve coefficients, duplicate
    ///   channel names, or non-finite or inconsistent spend bounds.
    /// - [`SolveError::Infeasible`] when the channel minimums alone exceed
    ///   the budget; detected analytically before any solve is attempted.
    pub fn new(channels: Vec<ChannelCurve>, total_budget: f64) -> Result<Self, SolveError> {
        if channels.is_empty() {
            return Err(SolveError::InvalidInput(
                "need at least one channel".to_string(),
            ));
        }

        if total_budget <= 0.0 || !total_budget.is_finite() {
            return Err(SolveError::InvalidInput(
                "budget must be positive".to_string(),
            ));
        }

        for ch in &channels {
            if !curves::validate_params(ch.curve_a, ch.curve_b) {
                return Err(SolveError::InvalidInput(format!(
                    "channel '{}' has non-positive curve parameters (a={}, b={})",
                    ch.channel, ch.curve_a, ch.curve_b
                )));
            }
            if !ch.min_spend.is_finite()
                || !ch.max_spend.is_finite()
                || ch.min_spend < 0.0
                || ch.max_spend <= ch.min_spend
            {
                return Err(SolveError::InvalidInput(format!(
                    "channel '{}' has invalid spend bounds [{}, {}]",
                    ch.channel, ch.min_spend, ch.max_spend
                )));
            }
        }

        let mut seen = FxHashSet::default();
        for ch in &channels {
            if !seen.insert(ch.channel.as_str()) {
                return Err(SolveError::InvalidInput(format!(
                    "duplicate channel '{}'",
                    ch.channel
                )));
            }
        }

        let total_min_spend: f64 = channels.iter().map(|ch| ch.min_spend).sum();
        if total_min_spend > total_budget {
            return Err(SolveError::Infeasible {
                total_min_spend,
                total_budget,
            });
        }

        Ok(Self {
            channels,
            total_budget,
        })
    }

    #[must_use]
    pub fn channels(&self) -> &[ChannelCurve] {
        &self.channels
    }

    #[must_use]
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Total predicted conversions for a spend vector (the objective being
    /// maximized). Spends are positional, matching [`channels`] order.
    ///
    /// [`channels`]: AllocationProblem::channels
    #[must_use]
    pub fn objective(&self, spends: &[f64]) -> f64 {
        self.channels
            .iter()
            .zip(spends.iter())
            .map(|(ch, &spend)| ch.conversions_at(spend))
            .sum()
    }

    /// Budget constraint residual: `total_budget - sum(spends)`. Zero at a
    /// feasible point.
    #[must_use]
    pub fn budget_residual(&self, spends: &[f64]) -> f64 {
        let allocated: f64 = spends.iter().sum();
        self.total_budget - allocated
    }

    /// Deterministic starting iterate: each channel gets its `max_spend`
    /// share of the summed maximums, scaled to consume the budget exactly.
    #[must_use]
    pub fn initial_iterate(&self) -> Vec<f64> {
        let total_max: f64 = self.channels.iter().map(|ch| ch.max_spend).sum();
        self.channels
            .iter()
            .map(|ch| self.total_budget * ch.max_spend / total_max)
            .collect()
    }
}

/// The result of a successful solve: a mapping from channel identifier to
/// assigned spend. Created once per solve and never mutated afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocation {
    spends: FxHashMap<String, f64>,
}

impl Allocation {
    /// Build an allocation from channel curves and a positional spend
    /// vector (the solver's internal representation).
    #[must_use]
    pub fn from_spends(channels: &[ChannelCurve], spends: &[f64]) -> Self {
        let spends = channels
            .iter()
            .zip(spends.iter())
            .map(|(ch, &spend)| (ch.channel.clone(), spend))
            .collect();
        Self { spends }
    }

    /// Assigned spend for a channel, if present.
    #[must_use]
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.spends.get(channel).copied()
    }

    /// Sum of all assigned spends.
    #[must_use]
    pub fn total_spend(&self) -> f64 {
        self.spends.values().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.spends.iter().map(|(ch, &spend)| (ch.as_str(), spend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_channels() -> Vec<ChannelCurve> {
        vec![
            ChannelCurve::new("google", 0.001, 1e-8, 5_000.0, 30_000.0),
            ChannelCurve::new("meta", 0.0008, 8e-9, 3_000.0, 25_000.0),
        ]
    }

    #[test]
    fn test_problem_rejects_empty_channels() {
        let err = AllocationProblem::new(vec![], 10_000.0).unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }

    #[test]
    fn test_problem_rejects_non_positive_budget() {
        for budget in [0.0, -1_000.0] {
            let err = AllocationProblem::new(two_channels(), budget).unwrap_err();
            assert!(matches!(err, SolveError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_problem_rejects_bad_curve_params() {
        let mut channels = two_channels();
        channels[0].curve_a = -0.001;
        let err = AllocationProblem::new(channels, 10_000.0).unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }

    #[test]
    fn test_problem_rejects_inverted_bounds() {
        let mut channels = two_channels();
        channels[1].max_spend = channels[1].min_spend;
        let err = AllocationProblem::new(channels, 10_000.0).unwrap_err();
        assert!(matches!(err, SolveError::InvalidInput(_)));
    }

    #[test]
    fn test_problem_rejects_non_finite_bounds() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut channels = two_channels();
            channels[0].max_spend = bad;
            let err = AllocationProblem::new(channels, 10_000.0).unwrap_err();
            assert!(matches!(err, SolveError::InvalidInput(_)));

            let mut channels = two_channels();
            channels[1].min_spend = bad;
            let err = AllocationProblem::new(channels, 10_000.0).unwrap_err();
            assert!(matches!(err, SolveError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_problem_rejects_duplicate_channel_names() {
        let mut channels = two_channels();
        channels[1].channel = "google".to_string();
        let err = AllocationProblem::new(channels, 10_000.0).unwrap_err();
        match err {
            SolveError::InvalidInput(msg) => assert!(msg.contains("duplicate")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_problem_detects_infeasible_minimums() {
        // Minimums sum to 8000
        let err = AllocationProblem::new(two_channels(), 7_000.0).unwrap_err();
        assert!(matches!(err, SolveError::Infeasible { .. }));
    }

    #[test]
    fn test_initial_iterate_consumes_budget() {
        let problem = AllocationProblem::new(two_channels(), 40_000.0).unwrap();
        let x0 = problem.initial_iterate();

        assert_eq!(x0.len(), 2);
        let total: f64 = x0.iter().sum();
        assert!((total - 40_000.0).abs() < 1e-9);
        // Proportional to max_spend: 30000/55000 and 25000/55000
        assert!((x0[0] - 40_000.0 * 30.0 / 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocation_round_trip() {
        let channels = two_channels();
        let allocation = Allocation::from_spends(&channels, &[20_000.0, 15_000.0]);

        assert_eq!(allocation.len(), 2);
        assert_eq!(allocation.get("google"), Some(20_000.0));
        assert_eq!(allocation.get("meta"), Some(15_000.0));
        assert_eq!(allocation.get("tiktok"), None);
        assert!((allocation.total_spend() - 35_000.0).abs() < 1e-9);
    }
}
