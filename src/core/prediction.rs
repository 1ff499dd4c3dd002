//! Prediction types for interval estimation.

use faer::Col;

/// Type of interval to compute for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalType {
    /// Interval for the mean response E[Y|X=x₀], from the coefficient covariance alone.
    #[default]
    Confidence,

    /// Interval for a new observation Y|X=x₀; adds the residual variance.
    Prediction,
}

/// Point predictions with optional intervals.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Point predictions.
    pub fit: Col<f64>,
    /// Lower bounds of the interval (equal to `fit` without intervals).
    pub lower: Col<f64>,
    /// Upper bounds of the interval (equal to `fit` without intervals).
    pub upper: Col<f64>,
    /// Standard errors of the predictions (NaN when unavailable).
    pub se: Col<f64>,
}

impl PredictionResult {
    /// Point predictions without intervals.
    pub fn point_only(fit: Col<f64>) -> Self {
        let n = fit.nrows();
        Self {
            lower: fit.clone(),
            upper: fit.clone(),
            se: Col::from_fn(n, |_| f64::NAN),
            fit,
        }
    }

    /// Point predictions with intervals.
    pub fn with_intervals(fit: Col<f64>, lower: Col<f64>, upper: Col<f64>, se: Col<f64>) -> Self {
        Self {
            fit,
            lower,
            upper,
            se,
        }
    }

    /// Number of predictions.
    pub fn len(&self) -> usize {
        self.fit.nrows()
    }

    /// Returns true if there are no predictions.
    pub fn is_empty(&self) -> bool {
        self.fit.nrows() == 0
    }
}
