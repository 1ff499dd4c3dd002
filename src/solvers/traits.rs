//! Core traits for regression estimators.

use crate::core::{IntervalType, NaError, OptionsError, PredictionResult, RegressionResult};
use crate::data::DataError;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during regression fitting.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("{names} column names given for {columns} design columns")]
    NameMismatch { names: usize, columns: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("design matrix has no columns")]
    EmptyDesign,

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("design is rank deficient; linearly dependent columns: {}", columns.join(", "))]
    Collinear { columns: Vec<String> },

    #[error(
        "model is under-identified: {endogenous} endogenous regressors but {instruments} excluded instruments"
    )]
    UnderIdentified {
        endogenous: usize,
        instruments: usize,
    },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error(transparent)]
    MissingValues(#[from] NaError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// A regression estimator that can be fit to data.
///
/// This trait follows the sklearn pattern where fitting returns a fitted model
/// that can then make predictions.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model to the data.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features)
    /// * `y` - Target vector of length n_samples
    ///
    /// # Returns
    /// A fitted model that can make predictions.
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted regression model that can make predictions.
pub trait FittedRegressor {
    /// Make predictions on new data.
    ///
    /// `x` has the same columns as the matrix passed to `fit` (without the
    /// constant if the estimator added one).
    fn predict(&self, x: &Mat<f64>) -> Col<f64>;

    /// Access the regression results (coefficients, statistics, etc.).
    fn result(&self) -> &RegressionResult;

    /// Get the coefficients (convenience method).
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    /// Get the intercept (convenience method).
    fn intercept(&self) -> Option<f64> {
        self.result().intercept()
    }

    /// Get R² (convenience method).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Calculate the score (R²) on new data.
    fn score(&self, x: &Mat<f64>, y: &Col<f64>) -> f64 {
        let predictions = self.predict(x);
        let n = y.nrows();

        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;

        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let rss: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&yi, &pi)| (yi - pi).powi(2))
            .sum();

        if tss == 0.0 {
            if rss == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - rss / tss
        }
    }

    /// Make predictions with confidence or prediction intervals.
    ///
    /// Follows R's `predict(..., interval = "confidence" | "prediction")`:
    /// `None` gives point predictions only, `Some(IntervalType::Confidence)`
    /// bounds the mean response using the fitted coefficient covariance, and
    /// `Some(IntervalType::Prediction)` adds the residual variance.
    fn predict_with_interval(
        &self,
        x: &Mat<f64>,
        interval: Option<IntervalType>,
        level: f64,
    ) -> PredictionResult;
}
