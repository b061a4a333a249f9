//! Passive per-iteration observer for the solver
//!
//! The tracker is handed each intermediate spend vector and appends a
//! snapshot of the objective, budget residual and per-channel spend. It
//! never influences solver control flow or the convergence decision; its
//! lifetime is scoped to a single solve call.

use super::result::{ConvergenceHistory, IterationRecord};
use crate::model::{AllocationProblem, ChannelCurve};

#[derive(Debug)]
pub struct ConvergenceTracker {
    channels: Vec<ChannelCurve>,
    total_budget: f64,
    history: ConvergenceHistory,
}

impl ConvergenceTracker {
    #[must_use]
    pub fn new(problem: &AllocationProblem) -> Self {
        let channels = problem.channels().to_vec();
        let names = channels.iter().map(|ch| ch.channel.clone()).collect();
        Self {
            channels,
            total_budget: problem.total_budget(),
            history: ConvergenceHistory::new(names),
        }
    }

    /// Record one solver iterate. Iteration indices are 1-based and
    /// monotonically increasing.
    pub fn observe(&mut self, spends: &[f64]) {
        let objective: f64 = self
            .channels
            .iter()
            .zip(spends.iter())
            .map(|(ch, &spend)| ch.conversions_at(spend))
            .sum();
        let allocated: f64 = spends.iter().sum();

        self.history.push(IterationRecord {
            iteration: self.history.num_iterations() + 1,
            objective,
            budget_error: self.total_budget - allocated,
            spends: spends.to_vec(),
        });
    }

    #[must_use]
    pub fn num_iterations(&self) -> usize {
        self.history.num_iterations()
    }

    /// Consume the tracker, yielding the accumulated history.
    #[must_use]
    pub fn into_history(self) -> ConvergenceHistory {
        self.history
    }
}
