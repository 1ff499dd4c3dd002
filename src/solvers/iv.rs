//! Instrumental variables regression by two-stage least squares (2SLS).
//!
//! Stage 1 regresses every endogenous regressor on the full instrument set
//! `Z = [W | Z_excluded]`; stage 2 solves the least squares problem for
//! `X̂ = [W | x̂]`. Residuals, and hence every covariance estimator, use the
//! structural residuals `u = y − Xβ` computed with the original regressors.

use crate::core::{
    CovarianceType, IntervalType, NaAction, NaHandler, PredictionResult, RankPolicy,
    RegressionOptions, RegressionOptionsBuilder, RegressionResult, TestDistribution,
};
use crate::data::{Dataset, IvDesign, IvSpec};
use crate::inference::WaldTest;
use crate::solvers::least_squares::{LeastSquares, LinearFit};
use crate::solvers::ols::{intercept_design, interval_prediction, linear_predictor, OlsRegressor};
use crate::solvers::traits::{FittedRegressor, RegressionError};
use crate::utils::{column, hstack, prepend_ones, select_columns};
use faer::{Col, Mat};

/// First-stage F below which an instrument set is flagged weak (Staiger–Stock).
pub const WEAK_INSTRUMENT_THRESHOLD: f64 = 10.0;

/// Two-stage least squares estimator.
///
/// # Example
///
/// ```
/// use ivreg::prelude::*;
/// use faer::{Col, Mat};
///
/// let n = 200;
/// let z = Mat::from_fn(n, 1, |i, _| ((i * 37) % 101) as f64 / 101.0);
/// let u = Col::from_fn(n, |i| ((i * 53) % 97) as f64 / 97.0 - 0.5);
/// let x = Mat::from_fn(n, 1, |i, _| z[(i, 0)] + 0.5 * u[i]);
/// let y = Col::from_fn(n, |i| 1.0 + 2.0 * x[(i, 0)] + u[i]);
///
/// let design = IvDesign::from_matrices(y, Mat::zeros(n, 0), x, z);
/// let fitted = IvRegressor::builder().build().fit(&design).unwrap();
///
/// assert_eq!(fitted.result().feature_names, vec!["const", "x0"]);
/// assert_eq!(fitted.first_stages().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IvRegressor {
    options: RegressionOptions,
}

/// Diagnostics of one first-stage regression.
#[derive(Debug, Clone)]
pub struct FirstStageDiagnostics {
    /// Excluded instrument names.
    pub instruments: Vec<String>,
    /// Coefficients on the excluded instruments.
    pub coefficients: Vec<f64>,
    /// Standard errors of those coefficients.
    pub std_errors: Vec<f64>,
    /// P-values of those coefficients.
    pub p_values: Vec<f64>,
    /// Wald F statistic that the excluded instruments are jointly zero.
    pub f_statistic: f64,
    /// P-value of `f_statistic`.
    pub f_pvalue: f64,
    /// Share of the variation left after the exogenous regressors that the
    /// excluded instruments explain.
    pub partial_r_squared: f64,
    /// `f_statistic` below [`WEAK_INSTRUMENT_THRESHOLD`] (or not computable).
    pub weak: bool,
}

/// First-stage regression of one endogenous regressor.
#[derive(Debug, Clone)]
pub struct FirstStage {
    pub endogenous: String,
    pub result: RegressionResult,
    pub diagnostics: FirstStageDiagnostics,
}

impl IvRegressor {
    /// Create a new 2SLS regressor with the given options.
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    /// Create a builder for configuring the regressor.
    pub fn builder() -> IvRegressorBuilder {
        IvRegressorBuilder::default()
    }

    /// Options used by this regressor.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Select `spec` from `data` and fit it.
    pub fn fit_dataset(&self, data: &Dataset, spec: &IvSpec) -> Result<FittedIv, RegressionError> {
        let design = data.iv_design(spec)?;
        self.fit(&design)
    }

    /// Fit the model.
    pub fn fit(&self, design: &IvDesign) -> Result<FittedIv, RegressionError> {
        self.options.validate()?;

        let n = design.y.nrows();
        for block in [&design.x_exog, &design.x_endog, &design.z] {
            if block.nrows() != n {
                return Err(RegressionError::DimensionMismatch {
                    x_rows: block.nrows(),
                    y_len: n,
                });
            }
        }
        let n_exog = design.x_exog.ncols();
        let n_endog = design.x_endog.ncols();
        let n_instr = design.z.ncols();
        if design.exogenous.len() != n_exog
            || design.endogenous.len() != n_endog
            || design.instruments.len() != n_instr
        {
            return Err(RegressionError::NameMismatch {
                names: design.exogenous.len() + design.endogenous.len() + design.instruments.len(),
                columns: n_exog + n_endog + n_instr,
            });
        }
        if n_endog == 0 || n_instr < n_endog {
            return Err(RegressionError::UnderIdentified {
                endogenous: n_endog,
                instruments: n_instr,
            });
        }

        // Missing values are resolved over the union of all columns.
        let all = hstack(&hstack(&design.x_exog, &design.x_endog), &design.z);
        let na = NaHandler::process(&all, &design.y, self.options.na_action)?;
        let range = |from: usize, len: usize| (from..from + len).collect::<Vec<_>>();
        let exog_raw = select_columns(&na.x_clean, &range(0, n_exog));
        let endog = select_columns(&na.x_clean, &range(n_exog, n_endog));
        let excluded = select_columns(&na.x_clean, &range(n_exog + n_endog, n_instr));
        let y = &na.y_clean;

        let (exog, exog_names, added_intercept) =
            intercept_design(&exog_raw, &design.exogenous, self.options.with_intercept);

        let instruments = hstack(&exog, &excluded);
        let instrument_names: Vec<String> = exog_names
            .iter()
            .chain(design.instruments.iter())
            .cloned()
            .collect();

        let n_clean = y.nrows();
        if n_clean < instruments.ncols() {
            return Err(RegressionError::InsufficientObservations {
                needed: instruments.ncols(),
                got: n_clean,
            });
        }

        log::debug!(
            "fitting 2SLS for '{}': n = {n_clean}, {n_endog} endogenous, {n_instr} excluded instruments",
            design.response
        );

        let first_stages = (0..n_endog)
            .map(|j| {
                self.first_stage(
                    &instruments,
                    &instrument_names,
                    &exog,
                    &column(&endog, j),
                    &design.endogenous[j],
                    exog.ncols(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let x_hat_endog = Mat::from_fn(n_clean, n_endog, |i, j| {
            first_stages[j].result.fitted_values[i]
        });
        let x = hstack(&exog, &endog);
        let x_hat = hstack(&exog, &x_hat_endog);
        let feature_names: Vec<String> = exog_names
            .iter()
            .chain(design.endogenous.iter())
            .cloned()
            .collect();

        let solution = LeastSquares::decompose(
            &x_hat,
            &feature_names,
            self.options.rank_policy,
            self.options.rank_tolerance,
        )?;
        let mut result = LinearFit {
            response_name: &design.response,
            feature_names: feature_names.clone(),
            design: &x,
            bread_design: &x_hat,
            y,
            solution: &solution,
            clamp_r_squared: false,
        }
        .into_result(&self.options);
        result.na_info = Some(na.na_info);

        let endogeneity =
            self.endogeneity_test(&x, &feature_names, y, &first_stages, &design.response);

        Ok(FittedIv {
            options: self.options.clone(),
            result,
            first_stages,
            endogeneity,
            added_intercept,
        })
    }

    fn stage_one_regressor(&self) -> OlsRegressor {
        OlsRegressor::new(RegressionOptions {
            with_intercept: false,
            na_action: NaAction::Fail,
            ..self.options.clone()
        })
    }

    fn first_stage(
        &self,
        instruments: &Mat<f64>,
        instrument_names: &[String],
        exog: &Mat<f64>,
        endogenous: &Col<f64>,
        name: &str,
        n_exog: usize,
    ) -> Result<FirstStage, RegressionError> {
        let fitted = self
            .stage_one_regressor()
            .fit_named(instruments, endogenous, instrument_names, name)?;
        let result = fitted.into_result();

        let excluded: Vec<usize> = (n_exog..instruments.ncols()).collect();
        let pick = |values: &Option<Col<f64>>| -> Vec<f64> {
            excluded
                .iter()
                .map(|&j| values.as_ref().map_or(f64::NAN, |v| v[j]))
                .collect()
        };

        let (f_statistic, f_pvalue) = result
            .covariance
            .as_ref()
            .and_then(|cov| WaldTest::zero_restrictions(&result.coefficients, cov, &excluded))
            .map_or((f64::NAN, f64::NAN), |wald| {
                (wald.f_statistic(), wald.f_pvalue(result.residual_df()))
            });

        let restricted_rss = if n_exog == 0 {
            endogenous.iter().map(|v| v * v).sum::<f64>()
        } else {
            OlsRegressor::new(RegressionOptions {
                with_intercept: false,
                compute_inference: false,
                na_action: NaAction::Fail,
                rank_policy: RankPolicy::Drop,
                ..self.options.clone()
            })
            .fit_named(exog, endogenous, &instrument_names[..n_exog], name)?
            .result()
            .rss()
        };
        let partial_r_squared = if restricted_rss > 0.0 {
            1.0 - result.rss() / restricted_rss
        } else {
            f64::NAN
        };

        let weak = f_statistic.is_nan() || f_statistic < WEAK_INSTRUMENT_THRESHOLD;
        if weak {
            log::warn!(
                "weak instruments for '{name}': first-stage F = {f_statistic:.3} < {WEAK_INSTRUMENT_THRESHOLD}"
            );
        }

        let diagnostics = FirstStageDiagnostics {
            instruments: excluded.iter().map(|&j| instrument_names[j].clone()).collect(),
            coefficients: excluded.iter().map(|&j| result.coefficients[j]).collect(),
            std_errors: pick(&result.std_errors),
            p_values: pick(&result.p_values),
            f_statistic,
            f_pvalue,
            partial_r_squared,
            weak,
        };

        Ok(FirstStage {
            endogenous: name.to_string(),
            result,
            diagnostics,
        })
    }

    /// Durbin–Wu–Hausman test: Wald test on the first-stage residuals added to
    /// the structural equation.
    fn endogeneity_test(
        &self,
        x: &Mat<f64>,
        names: &[String],
        y: &Col<f64>,
        first_stages: &[FirstStage],
        response: &str,
    ) -> Option<WaldTest> {
        let n = y.nrows();
        let residuals = Mat::from_fn(n, first_stages.len(), |i, j| {
            first_stages[j].result.residuals[i]
        });
        let augmented = hstack(x, &residuals);
        let augmented_names: Vec<String> = names
            .iter()
            .cloned()
            .chain(first_stages.iter().map(|s| format!("v_{}", s.endogenous)))
            .collect();

        let fitted = OlsRegressor::new(RegressionOptions {
            with_intercept: false,
            compute_inference: true,
            na_action: NaAction::Fail,
            ..self.options.clone()
        })
        .fit_named(&augmented, y, &augmented_names, response)
        .ok()?;

        let result = fitted.result();
        let tested: Vec<usize> = (x.ncols()..augmented.ncols()).collect();
        WaldTest::zero_restrictions(&result.coefficients, result.covariance.as_ref()?, &tested)
    }
}

/// A fitted 2SLS model.
#[derive(Debug, Clone)]
pub struct FittedIv {
    options: RegressionOptions,
    result: RegressionResult,
    first_stages: Vec<FirstStage>,
    endogeneity: Option<WaldTest>,
    added_intercept: bool,
}

impl FittedIv {
    /// Get the options used to fit this model.
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// First-stage regressions, one per endogenous regressor.
    pub fn first_stages(&self) -> &[FirstStage] {
        &self.first_stages
    }

    /// Durbin–Wu–Hausman endogeneity test, if it could be computed.
    pub fn endogeneity_test(&self) -> Option<&WaldTest> {
        self.endogeneity.as_ref()
    }

    /// Whether any first stage is flagged weak.
    pub fn has_weak_instruments(&self) -> bool {
        self.first_stages.iter().any(|s| s.diagnostics.weak)
    }

    /// Whether the estimator prepended the `const` column.
    pub fn added_intercept(&self) -> bool {
        self.added_intercept
    }

    fn prediction_design(&self, x: &Mat<f64>) -> Mat<f64> {
        if self.added_intercept {
            prepend_ones(x)
        } else {
            x.clone()
        }
    }
}

impl FittedRegressor for FittedIv {
    /// `x` holds the exogenous then the endogenous regressors, without the
    /// constant if the estimator added it.
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

/// Builder for `IvRegressor`.
#[derive(Debug, Clone, Default)]
pub struct IvRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl IvRegressorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant to the exogenous regressors (default true).
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    /// Covariance estimator for both stages.
    pub fn covariance(mut self, covariance: CovarianceType) -> Self {
        self.builder = self.builder.covariance(covariance);
        self
    }

    pub fn distribution(mut self, distribution: TestDistribution) -> Self {
        self.builder = self.builder.distribution(distribution);
        self
    }

    pub fn na_action(mut self, action: NaAction) -> Self {
        self.builder = self.builder.na_action(action);
        self
    }

    pub fn rank_policy(mut self, policy: RankPolicy) -> Self {
        self.builder = self.builder.rank_policy(policy);
        self
    }

    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    /// Build the 2SLS regressor. Options are validated when fitting.
    pub fn build(self) -> IvRegressor {
        IvRegressor::new(self.builder.build_unchecked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn just_identified(n: usize) -> IvDesign {
        let z = Mat::from_fn(n, 1, |i, _| ((i * 37) % 101) as f64 / 101.0);
        let u = Col::from_fn(n, |i| ((i * 53) % 97) as f64 / 97.0 - 0.5);
        let x = Mat::from_fn(n, 1, |i, _| z[(i, 0)] + 0.5 * u[i]);
        let y = Col::from_fn(n, |i| 1.0 + 2.0 * x[(i, 0)] + u[i]);
        IvDesign::from_matrices(y, Mat::zeros(n, 0), x, z)
    }

    #[test]
    fn test_under_identified() {
        let mut design = just_identified(50);
        design.z = Mat::zeros(50, 0);
        design.instruments.clear();
        assert!(matches!(
            IvRegressor::default().fit(&design),
            Err(RegressionError::UnderIdentified { endogenous: 1, instruments: 0 })
        ));
    }

    #[test]
    fn test_no_endogenous_regressor() {
        let mut design = just_identified(50);
        design.x_endog = Mat::zeros(50, 0);
        design.endogenous.clear();
        assert!(matches!(
            IvRegressor::default().fit(&design),
            Err(RegressionError::UnderIdentified { endogenous: 0, .. })
        ));
    }

    #[test]
    fn test_just_identified_matches_indirect_least_squares() {
        // With one instrument and a constant, β = cov(z, y) / cov(z, x).
        let design = just_identified(300);
        let fitted = IvRegressor::default().fit(&design).unwrap();

        let n = 300.0;
        let mean = |v: &dyn Fn(usize) -> f64| (0..300).map(v).sum::<f64>() / n;
        let zm = mean(&|i| design.z[(i, 0)]);
        let xm = mean(&|i| design.x_endog[(i, 0)]);
        let ym = mean(&|i| design.y[i]);
        let szy: f64 = (0..300).map(|i| (design.z[(i, 0)] - zm) * (design.y[i] - ym)).sum();
        let szx: f64 = (0..300)
            .map(|i| (design.z[(i, 0)] - zm) * (design.x_endog[(i, 0)] - xm))
            .sum();

        let beta = fitted.result().coefficient("x0").unwrap();
        assert!((beta - szy / szx).abs() < 1e-8);
    }

    #[test]
    fn test_residuals_use_original_regressors() {
        let design = just_identified(120);
        let fitted = IvRegressor::default().fit(&design).unwrap();
        let r = fitted.result();

        for i in 0..120 {
            let structural =
                design.y[i] - r.coefficients[0] - r.coefficients[1] * design.x_endog[(i, 0)];
            assert!((r.residuals[i] - structural).abs() < 1e-10);
        }
    }
}
