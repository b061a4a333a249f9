//! Convergence history types
//!
//! Records the solver's intermediate iterates for diagnostic and
//! visualization consumption. Append-only during a solve, immutable once
//! returned.

use serde::{Deserialize, Serialize};

/// A single solver iterate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration index, strictly increasing
    pub iteration: usize,

    /// Total conversions at this iterate (not negated)
    pub objective: f64,

    /// Budget constraint residual: `total_budget - sum(spend)`
    pub budget_error: f64,

    /// Per-channel spend at this iterate, positional in channel order
    pub spends: Vec<f64>,
}

/// Ordered sequence of solver iterates, one record per iteration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    channels: Vec<String>,
    records: Vec<IterationRecord>,
}

impl ConvergenceHistory {
    #[must_use]
    pub fn new(channels: Vec<String>) -> Self {
        Self {
            channels,
            records: Vec::new(),
        }
    }

    pub(super) fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    /// Channel names, in the order used by each record's `spends`
    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    #[must_use]
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    #[must_use]
    pub fn num_iterations(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iteration indices as an aligned series
    #[must_use]
    pub fn iterations(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.iteration).collect()
    }

    /// Objective values as an aligned series
    #[must_use]
    pub fn objectives(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.objective).collect()
    }

    /// Budget residuals as an aligned series
    #[must_use]
    pub fn budget_errors(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.budget_error).collect()
    }

    /// One channel's spend trajectory across iterations, or `None` for an
    /// unknown channel
    #[must_use]
    pub fn spend_series(&self, channel: &str) -> Option<Vec<f64>> {
        let idx = self.channels.iter().position(|ch| ch == channel)?;
        Some(self.records.iter().map(|r| r.spends[idx]).collect())
    }

    /// Objective at the last iterate, if any iterations were recorded
    #[must_use]
    pub fn final_objective(&self) -> Option<f64> {
        self.records.last().map(|r| r.objective)
    }
}
