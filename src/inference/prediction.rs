//! Prediction interval calculations.

use super::coefficient::critical_value;
use crate::core::{IntervalType, PredictionResult, TestDistribution};
use faer::{Col, Mat};

/// Computes intervals for predictions at new design rows.
///
/// # Arguments
/// * `x_new` - New design rows, with the same columns as the fitted design
///   (including the constant column if one was added)
/// * `covariance` - Coefficient covariance matrix of the fit
/// * `predictions` - Point predictions for `x_new`
/// * `aliased` - Coefficients to skip (aliased columns do not contribute)
/// * `mse` - Residual variance, added for prediction intervals
/// * `distribution` - Reference distribution for the critical value
/// * `df` - Residual degrees of freedom
/// * `confidence_level` - Confidence level (e.g., 0.95)
/// * `interval_type` - Confidence or Prediction interval
#[allow(clippy::too_many_arguments)]
pub fn compute_prediction_intervals(
    x_new: &Mat<f64>,
    covariance: &Mat<f64>,
    predictions: &Col<f64>,
    aliased: &[bool],
    mse: f64,
    distribution: TestDistribution,
    df: f64,
    confidence_level: f64,
    interval_type: IntervalType,
) -> PredictionResult {
    let n_new = x_new.nrows();
    let q = critical_value(distribution, df, confidence_level);

    let se = Col::from_fn(n_new, |i| {
        let row = Col::from_fn(x_new.ncols(), |j| if aliased[j] { 0.0 } else { x_new[(i, j)] });
        let mean_var = quadratic_form(&row, covariance, aliased);
        let var = match interval_type {
            IntervalType::Confidence => mean_var,
            IntervalType::Prediction => mean_var + mse,
        };
        if var >= 0.0 {
            var.sqrt()
        } else {
            f64::NAN
        }
    });

    let lower = Col::from_fn(n_new, |i| predictions[i] - q * se[i]);
    let upper = Col::from_fn(n_new, |i| predictions[i] + q * se[i]);

    PredictionResult::with_intervals(predictions.clone(), lower, upper, se)
}

/// x₀' V x₀ over the non-aliased entries.
fn quadratic_form(x0: &Col<f64>, covariance: &Mat<f64>, aliased: &[bool]) -> f64 {
    let p = x0.nrows();
    let mut total = 0.0;
    for i in (0..p).filter(|&i| !aliased[i]) {
        for j in (0..p).filter(|&j| !aliased[j]) {
            total += x0[i] * covariance[(i, j)] * x0[j];
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_form_identity() {
        let x0 = Col::from_fn(2, |i| (i + 1) as f64);
        let cov = Mat::from_fn(2, 2, |i, j| if i == j { 1.0 } else { 0.0 });

        // ||x₀||² = 1 + 4
        assert!((quadratic_form(&x0, &cov, &[false, false]) - 5.0).abs() < 1e-10);
        assert!((quadratic_form(&x0, &cov, &[false, true]) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_prediction_interval_wider_than_confidence() {
        let x_new = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let cov = Mat::from_fn(2, 2, |i, j| if i == j { 0.1 } else { 0.0 });
        let predictions = Col::from_fn(3, |i| i as f64);

        let interval = |kind| {
            compute_prediction_intervals(
                &x_new,
                &cov,
                &predictions,
                &[false, false],
                1.0,
                TestDistribution::StudentT,
                10.0,
                0.95,
                kind,
            )
        };
        let ci = interval(IntervalType::Confidence);
        let pi = interval(IntervalType::Prediction);

        for i in 0..3 {
            let ci_width = ci.upper[i] - ci.lower[i];
            let pi_width = pi.upper[i] - pi.lower[i];
            assert!(pi_width > ci_width, "PI should be wider than CI");
            assert!((ci.fit[i] - predictions[i]).abs() < 1e-12);
        }
    }
}
