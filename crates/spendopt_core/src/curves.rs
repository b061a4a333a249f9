//! Quadratic response curve math
//!
//! Models diminishing returns in advertising performance: conversions are a
//! concave quadratic function of spend, so each additional dollar yields
//! progressively fewer conversions. All functions here are pure.

use crate::error::CurveError;

/// Conversions at a given spend level: `a * spend - b * spend^2`.
///
/// `a` is the initial conversions per dollar (roughly CTR * CVR / CPC) and
/// `b` is the curvature that flattens performance as spend grows. Valid for
/// any spend; callers keep spend below [`saturation_point`] so the curve
/// stays monotone increasing.
#[must_use]
pub fn conversions(spend: f64, a: f64, b: f64) -> f64 {
    a * spend - b * spend * spend
}

/// Marginal conversions per additional dollar at `spend`: `a - 2 * b * spend`.
///
/// Strictly decreasing in spend (diminishing returns).
#[must_use]
pub fn marginal(spend: f64, a: f64, b: f64) -> f64 {
    a - 2.0 * b * spend
}

/// Spend level at which the curve peaks (`a / 2b`); marginal return is zero
/// here and negative beyond.
#[must_use]
pub fn saturation_point(a: f64, b: f64) -> f64 {
    a / (2.0 * b)
}

/// Whether curve coefficients make business sense: diminishing but positive
/// returns require both `a > 0` and `b > 0`.
#[must_use]
pub fn validate_params(a: f64, b: f64) -> bool {
    a > 0.0 && b > 0.0
}

/// Evaluate [`conversions`] at each spend level.
///
/// Used by the reporting and sweep layers to sample a channel's full
/// response curve. Fails if the parameters are out of domain.
pub fn batch_conversions(spend_levels: &[f64], a: f64, b: f64) -> Result<Vec<f64>, CurveError> {
    if !validate_params(a, b) {
        return Err(CurveError::InvalidParameters { a, b });
    }

    Ok(spend_levels
        .iter()
        .map(|&spend| conversions(spend, a, b))
        .collect())
}

/// Cost per acquisition: spend divided by conversions, infinite when no
/// conversions are predicted.
#[must_use]
pub fn cost_per_acquisition(spend: f64, conversions: f64) -> f64 {
    if conversions <= 0.0 {
        f64::INFINITY
    } else {
        spend / conversions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_matches_formula() {
        let (a, b) = (0.001, 1e-8);
        let spend = 10_000.0;

        let result = conversions(spend, a, b);

        assert!(result > 0.0);
        let expected = a * spend - b * spend * spend;
        assert!((result - expected).abs() < 1e-10);
    }

    #[test]
    fn test_marginal_decreasing() {
        let (a, b) = (0.001, 1e-8);

        let roi_low = marginal(5_000.0, a, b);
        let roi_high = marginal(10_000.0, a, b);

        assert!(roi_low > roi_high);
        assert!(roi_low > 0.0);
        assert!(roi_high > 0.0);
    }

    #[test]
    fn test_curve_monotone_below_saturation() {
        let (a, b) = (0.001, 1e-8);
        let levels = [1_000.0, 5_000.0, 10_000.0, 15_000.0];

        let values: Vec<f64> = levels.iter().map(|&s| conversions(s, a, b)).collect();
        for pair in values.windows(2) {
            assert!(pair[1] > pair[0]);
        }

        let rois: Vec<f64> = levels.iter().map(|&s| marginal(s, a, b)).collect();
        for pair in rois.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(rois.iter().all(|&r| r > 0.0));
    }

    #[test]
    fn test_saturation_point_has_zero_marginal() {
        let (a, b) = (0.0008, 8e-9);
        let apex = saturation_point(a, b);
        assert!(marginal(apex, a, b).abs() < 1e-12);
    }

    #[test]
    fn test_validate_params() {
        assert!(validate_params(0.001, 1e-8));
        assert!(!validate_params(-0.001, 1e-8));
        assert!(!validate_params(0.001, -1e-8));
        assert!(!validate_params(0.0, 1e-8));
        assert!(!validate_params(0.001, 0.0));
    }

    #[test]
    fn test_batch_conversions() {
        let (a, b) = (0.001, 1e-8);
        let levels = [1_000.0, 5_000.0, 10_000.0];

        let results = batch_conversions(&levels, a, b).unwrap();

        assert_eq!(results.len(), levels.len());
        for (&spend, &result) in levels.iter().zip(results.iter()) {
            assert!((result - conversions(spend, a, b)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_batch_conversions_invalid_params() {
        let err = batch_conversions(&[1_000.0], -0.001, 1e-8).unwrap_err();
        assert!(matches!(err, CurveError::InvalidParameters { .. }));
    }

    #[test]
    fn test_cost_per_acquisition() {
        assert!((cost_per_acquisition(1_000.0, 50.0) - 20.0).abs() < 1e-12);
        assert!(cost_per_acquisition(1_000.0, 0.0).is_infinite());
    }
}
