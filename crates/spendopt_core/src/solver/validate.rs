//! Independent feasibility check for candidate allocations
//!
//! Re-checks a solution against the budget equality and per-channel bounds
//! with its own tolerance, separate from the solver's internal logic. Used
//! by the solver to reject numerically invalid results and available to
//! consumer code for the same purpose.

use crate::model::{Allocation, ChannelCurve};

/// Numerical tolerance for floating point constraint comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// True iff the allocation spends the budget exactly (within `tolerance`)
/// and every channel's spend lies within its bounds (within `tolerance`).
///
/// Pure and infallible. A channel missing from the allocation is a caller
/// contract violation and simply fails validation.
#[must_use]
pub fn validate_allocation(
    allocation: &Allocation,
    channels: &[ChannelCurve],
    total_budget: f64,
    tolerance: f64,
) -> bool {
    if (allocation.total_spend() - total_budget).abs() > tolerance {
        return false;
    }

    channels.iter().all(|ch| match allocation.get(&ch.channel) {
        Some(spend) => {
            spend >= ch.min_spend - tolerance && spend <= ch.max_spend + tolerance
        }
        None => false,
    })
}
