//! Regression result structures.

use super::na_action::NaInfo;
use super::options::{CovarianceType, TestDistribution};
use faer::{Col, Mat};

/// Complete result from a regression fit.
///
/// Coefficients are stored in design-column order, one per column of the design
/// actually fitted (including the `const` column when one was added). Inference
/// statistics are present when they were requested and computable.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    // ========== Core Results ==========
    /// Name of the response variable.
    pub response_name: String,

    /// Names of the design columns, aligned with `coefficients`.
    pub feature_names: Vec<String>,

    /// Estimated coefficients. Aliased coefficients are NaN.
    pub coefficients: Col<f64>,

    /// Position of the column of ones in the design, if any.
    pub intercept_index: Option<usize>,

    /// Whether the design contains a constant column (controls centring of R²).
    pub has_constant: bool,

    /// Residuals (y - fitted_values).
    pub residuals: Col<f64>,

    /// Fitted values on the estimation rows.
    pub fitted_values: Col<f64>,

    // ========== Rank Information ==========
    /// Numerical rank of the design matrix.
    pub rank: usize,

    /// Number of estimated parameters (equal to the rank).
    pub n_parameters: usize,

    /// Number of observations used in the fit.
    pub n_observations: usize,

    /// Which coefficients are aliased (linearly dependent and dropped).
    pub aliased: Vec<bool>,

    /// Tolerance used for rank determination.
    pub rank_tolerance: f64,

    // ========== Fit Statistics ==========
    /// Coefficient of determination (R²).
    pub r_squared: f64,

    /// Adjusted R².
    pub adj_r_squared: f64,

    /// Root mean squared error.
    pub rmse: f64,

    /// Residual variance estimate, SSR / (n - rank).
    pub mse: f64,

    /// Wald F-statistic for all non-constant coefficients.
    pub f_statistic: f64,

    /// P-value for the F-statistic.
    pub f_pvalue: f64,

    // ========== Information Criteria ==========
    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    /// Gaussian log-likelihood.
    pub log_likelihood: f64,

    // ========== Inference Statistics (Optional) ==========
    /// Covariance estimator used for inference.
    pub covariance_type: CovarianceType,

    /// Reference distribution used for tests and intervals.
    pub distribution: TestDistribution,

    /// Coefficient covariance matrix.
    pub covariance: Option<Mat<f64>>,

    /// Standard errors of coefficients.
    pub std_errors: Option<Col<f64>>,

    /// Test statistics (t or z, depending on `distribution`).
    pub t_statistics: Option<Col<f64>>,

    /// Two-sided p-values.
    pub p_values: Option<Col<f64>>,

    /// Lower bounds of confidence intervals.
    pub conf_interval_lower: Option<Col<f64>>,

    /// Upper bounds of confidence intervals.
    pub conf_interval_upper: Option<Col<f64>>,

    /// Confidence level used for intervals.
    pub confidence_level: f64,

    // ========== NA Handling Information ==========
    /// Rows removed because of missing values.
    pub na_info: Option<NaInfo>,
}

impl RegressionResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(feature_names: Vec<String>, n_observations: usize) -> Self {
        let n_features = feature_names.len();
        Self {
            response_name: String::from("y"),
            feature_names,
            coefficients: Col::zeros(n_features),
            intercept_index: None,
            has_constant: false,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 0,
            n_observations,
            aliased: vec![false; n_features],
            rank_tolerance: 1e-7,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            rmse: 0.0,
            mse: 0.0,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            log_likelihood: f64::NAN,
            covariance_type: CovarianceType::HC0,
            distribution: TestDistribution::Normal,
            covariance: None,
            std_errors: None,
            t_statistics: None,
            p_values: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            confidence_level: 0.95,
            na_info: None,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Model degrees of freedom (p - 1 with a constant, else p).
    pub fn model_df(&self) -> usize {
        if self.has_constant {
            self.n_parameters.saturating_sub(1)
        } else {
            self.n_parameters
        }
    }

    /// Count of non-aliased (active) coefficients.
    pub fn n_active_coefficients(&self) -> usize {
        self.aliased.iter().filter(|&&a| !a).count()
    }

    /// Check if any coefficients are aliased.
    pub fn has_aliased(&self) -> bool {
        self.aliased.iter().any(|&a| a)
    }

    /// Position of a design column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Coefficient by position, `None` for aliased coefficients.
    pub fn get_coefficient(&self, index: usize) -> Option<f64> {
        if index < self.coefficients.nrows() && !self.aliased[index] {
            Some(self.coefficients[index])
        } else {
            None
        }
    }

    /// Coefficient by column name, `None` if absent or aliased.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.index_of(name).and_then(|j| self.get_coefficient(j))
    }

    /// Standard error by column name.
    pub fn std_error(&self, name: &str) -> Option<f64> {
        let j = self.index_of(name)?;
        self.std_errors.as_ref().map(|se| se[j])
    }

    /// P-value by column name.
    pub fn p_value(&self, name: &str) -> Option<f64> {
        let j = self.index_of(name)?;
        self.p_values.as_ref().map(|p| p[j])
    }

    /// Coefficient on the column of ones, if the design has one.
    pub fn intercept(&self) -> Option<f64> {
        self.intercept_index.and_then(|j| self.get_coefficient(j))
    }

    /// Total sum of squares, centred when the design has a constant.
    pub fn tss(&self) -> f64 {
        let n = self.n_observations as f64;
        let y: Vec<f64> = self
            .residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| f + r)
            .collect();
        let center = if self.has_constant {
            y.iter().sum::<f64>() / n
        } else {
            0.0
        };
        y.iter().map(|&yi| (yi - center).powi(2)).sum()
    }

    /// Residual sum of squares (RSS).
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }

    /// Explained sum of squares (ESS = TSS - RSS).
    pub fn ess(&self) -> f64 {
        self.tss() - self.rss()
    }

    // ========== NA-Aware Methods ==========

    /// Residuals padded with NaN at removed rows (for `NaAction::Exclude`).
    pub fn residuals_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.residuals),
            _ => self.residuals.clone(),
        }
    }

    /// Fitted values padded with NaN at removed rows (for `NaAction::Exclude`).
    pub fn fitted_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.fitted_values),
            _ => self.fitted_values.clone(),
        }
    }

    /// Check if rows were removed because of missing values.
    pub fn had_na_removed(&self) -> bool {
        self.na_info.as_ref().is_some_and(|info| info.has_removed())
    }

    /// Number of rows removed because of missing values.
    pub fn n_na_removed(&self) -> usize {
        self.na_info.as_ref().map_or(0, |info| info.n_removed)
    }

    /// Number of rows before missing value removal.
    pub fn n_original_observations(&self) -> usize {
        self.na_info
            .as_ref()
            .map_or(self.n_observations, |info| info.n_original)
    }
}
