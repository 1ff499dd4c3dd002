//! Ordinary Least Squares regression solver.

use crate::core::{
    CovarianceType, IntervalType, NaAction, NaHandler, PredictionResult, RankPolicy,
    RegressionOptions, RegressionOptionsBuilder, RegressionResult, TestDistribution,
};
use crate::data::{default_names, Dataset, Design, ModelSpec, CONSTANT_COLUMN};
use crate::inference::compute_prediction_intervals;
use crate::solvers::least_squares::{LeastSquares, LinearFit};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{ones_column_index, prepend_ones};
use faer::{Col, Mat};

/// Ordinary Least Squares regression estimator.
///
/// Solves through a QR factorisation of the design and reports
/// heteroskedasticity-robust (HC0) standard errors unless configured otherwise.
/// With `with_intercept(true)` (the default) a `const` column of ones is
/// prepended unless the design already has one.
///
/// # Example
///
/// ```
/// use ivreg::prelude::*;
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(5, 1, |i, _| (i + 1) as f64);
/// let y = Col::from_fn(5, |i| [2.0, 4.0, 5.0, 4.0, 5.0][i]);
///
/// let fitted = OlsRegressor::builder()
///     .covariance(CovarianceType::Classical)
///     .build()
///     .fit(&x, &y)
///     .unwrap();
///
/// assert!((fitted.result().coefficient("x0").unwrap() - 0.6).abs() < 1e-10);
/// assert!((fitted.intercept().unwrap() - 2.2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    /// Create a new OLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    /// Options used by this regressor.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Fit a materialised design, keeping its column and response names.
    pub fn fit_design(&self, design: &Design) -> Result<FittedOls, RegressionError> {
        self.fit_named(&design.x, &design.y, &design.regressors, &design.response)
    }

    /// Select `spec` from `data` and fit it.
    pub fn fit_dataset(
        &self,
        data: &Dataset,
        spec: &ModelSpec,
    ) -> Result<FittedOls, RegressionError> {
        let design = data.design(spec)?;
        self.fit_design(&design)
    }

    pub(crate) fn fit_named(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        names: &[String],
        response: &str,
    ) -> Result<FittedOls, RegressionError> {
        self.options.validate()?;

        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }
        if names.len() != x.ncols() {
            return Err(RegressionError::NameMismatch {
                names: names.len(),
                columns: x.ncols(),
            });
        }

        let na = NaHandler::process(x, y, self.options.na_action)?;
        let (design, feature_names, added_intercept) =
            intercept_design(&na.x_clean, names, self.options.with_intercept);

        let n = design.nrows();
        let k = design.ncols();
        if k == 0 {
            return Err(RegressionError::EmptyDesign);
        }
        if n < k {
            return Err(RegressionError::InsufficientObservations { needed: k, got: n });
        }

        log::debug!(
            "fitting OLS for '{response}': n = {n}, k = {k}, covariance = {}",
            self.options.covariance.label()
        );

        let solution = LeastSquares::decompose(
            &design,
            &feature_names,
            self.options.rank_policy,
            self.options.rank_tolerance,
        )?;

        let mut result = LinearFit {
            response_name: response,
            feature_names,
            design: &design,
            bread_design: &design,
            y: &na.y_clean,
            solution: &solution,
            clamp_r_squared: true,
        }
        .into_result(&self.options);
        result.na_info = Some(na.na_info);

        Ok(FittedOls {
            options: self.options.clone(),
            result,
            added_intercept,
        })
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.fit_named(x, y, &default_names(x.ncols()), "y")
    }
}

/// Prepend a `const` column unless disabled or a column of ones is present.
pub(crate) fn intercept_design(
    x: &Mat<f64>,
    names: &[String],
    with_intercept: bool,
) -> (Mat<f64>, Vec<String>, bool) {
    if with_intercept && ones_column_index(x).is_none() {
        let names = std::iter::once(CONSTANT_COLUMN.to_string())
            .chain(names.iter().cloned())
            .collect();
        (prepend_ones(x), names, true)
    } else {
        (x.clone(), names.to_vec(), false)
    }
}

/// Linear predictor over the non-aliased coefficients.
pub(crate) fn linear_predictor(design: &Mat<f64>, result: &RegressionResult) -> Col<f64> {
    Col::from_fn(design.nrows(), |i| {
        (0..design.ncols())
            .filter(|&j| !result.aliased[j])
            .map(|j| design[(i, j)] * result.coefficients[j])
            .sum::<f64>()
    })
}

/// Point predictions plus optional intervals from a fitted result.
pub(crate) fn interval_prediction(
    design: &Mat<f64>,
    result: &RegressionResult,
    interval: Option<IntervalType>,
    level: f64,
) -> PredictionResult {
    let predictions = linear_predictor(design, result);

    match (interval, &result.covariance) {
        (None, _) => PredictionResult::point_only(predictions),
        (Some(interval_type), Some(covariance)) => compute_prediction_intervals(
            design,
            covariance,
            &predictions,
            &result.aliased,
            result.mse,
            result.distribution,
            result.residual_df() as f64,
            level,
            interval_type,
        ),
        (Some(_), None) => {
            // No covariance without inference
            let n = design.nrows();
            let nan = Col::from_fn(n, |_| f64::NAN);
            PredictionResult::with_intervals(predictions, nan.clone(), nan.clone(), nan)
        }
    }
}

/// A fitted OLS regression model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
    added_intercept: bool,
}

impl FittedOls {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Whether the estimator prepended the `const` column.
    pub fn added_intercept(&self) -> bool {
        self.added_intercept
    }

    /// Consume the model, keeping only its result.
    pub fn into_result(self) -> RegressionResult {
        self.result
    }

    fn prediction_design(&self, x: &Mat<f64>) -> Mat<f64> {
        if self.added_intercept {
            prepend_ones(x)
        } else {
            x.clone()
        }
    }
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        linear_predictor(&self.prediction_design(x), &self.result)
    }

    fn result(&self) -> &RegressionResult {
        &self.result
    }

    fn predict_with_interval(
        &self,
        x: &Mat<f64>,
        interval: Option<IntervalType>,
        level: f64,
    ) -> PredictionResult {
        interval_prediction(&self.prediction_design(x), &self.result, interval, level)
    }
}

/// Builder for `OlsRegressor`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Set the coefficient covariance estimator.
    pub fn covariance(mut self, covariance: CovarianceType) -> Self {
        self.builder = self.builder.covariance(covariance);
        self
    }

    /// Set the reference distribution for tests and intervals.
    pub fn distribution(mut self, distribution: TestDistribution) -> Self {
        self.builder = self.builder.distribution(distribution);
        self
    }

    /// Set how rows with missing values are handled.
    pub fn na_action(mut self, action: NaAction) -> Self {
        self.builder = self.builder.na_action(action);
        self
    }

    /// Set how a rank-deficient design is handled.
    pub fn rank_policy(mut self, policy: RankPolicy) -> Self {
        self.builder = self.builder.rank_policy(policy);
        self
    }

    /// Set the relative tolerance for detecting dependent columns.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the OLS regressor. Options are validated when fitting.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
