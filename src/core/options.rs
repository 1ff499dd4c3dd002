//! Regression options and configuration.

use super::na_action::NaAction;
use thiserror::Error;

/// Coefficient covariance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceType {
    /// Homoskedastic covariance σ²(X'X)⁻¹.
    Classical,
    /// White's heteroskedasticity-consistent sandwich estimator (default).
    #[default]
    HC0,
    /// HC0 scaled by n / (n - k).
    HC1,
    /// Squared residuals scaled by 1 / (1 - hᵢ).
    HC2,
    /// Squared residuals scaled by 1 / (1 - hᵢ)².
    HC3,
}

impl CovarianceType {
    /// Whether this estimator is heteroskedasticity-robust.
    pub fn is_robust(&self) -> bool {
        !matches!(self, CovarianceType::Classical)
    }

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            CovarianceType::Classical => "nonrobust",
            CovarianceType::HC0 => "HC0",
            CovarianceType::HC1 => "HC1",
            CovarianceType::HC2 => "HC2",
            CovarianceType::HC3 => "HC3",
        }
    }
}

/// Reference distribution for coefficient tests and intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestDistribution {
    /// Student's t with n - rank degrees of freedom.
    StudentT,
    /// Standard normal.
    Normal,
}

/// What to do when the design matrix does not have full column rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankPolicy {
    /// Return `RegressionError::Collinear` naming the dependent columns.
    #[default]
    Fail,
    /// Solve with the Moore-Penrose pseudo-inverse (minimum-norm coefficients).
    PseudoInverse,
    /// Mark dependent columns as aliased (NaN) and fit the remaining columns.
    Drop,
}

/// Configuration options for regression models.
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Whether to add an intercept column (default: true). Skipped when the
    /// design already contains a column of ones.
    pub with_intercept: bool,
    /// Whether to compute standard errors and inference statistics (default: true).
    pub compute_inference: bool,
    /// Confidence level for confidence intervals (default: 0.95).
    pub confidence_level: f64,
    /// Coefficient covariance estimator (default: HC0).
    pub covariance: CovarianceType,
    /// Test distribution; `None` picks t for classical and normal for robust covariance.
    pub distribution: Option<TestDistribution>,
    /// Missing value policy (default: drop incomplete rows).
    pub na_action: NaAction,
    /// Rank deficiency policy (default: fail).
    pub rank_policy: RankPolicy,
    /// Relative tolerance for detecting linearly dependent columns.
    pub rank_tolerance: f64,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            compute_inference: true,
            confidence_level: 0.95,
            covariance: CovarianceType::HC0,
            distribution: None,
            na_action: NaAction::Omit,
            rank_policy: RankPolicy::Fail,
            rank_tolerance: 1e-7,
        }
    }
}

/// Errors that can occur when validating regression options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),
}

impl RegressionOptions {
    /// Create a new builder for regression options.
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    /// Options with homoskedastic standard errors.
    pub fn classical() -> Self {
        Self {
            covariance: CovarianceType::Classical,
            ..Default::default()
        }
    }

    /// Options with the given robust covariance estimator.
    pub fn robust(covariance: CovarianceType) -> Self {
        Self {
            covariance,
            ..Default::default()
        }
    }

    /// The distribution actually used for tests.
    pub fn test_distribution(&self) -> TestDistribution {
        self.distribution.unwrap_or(if self.covariance.is_robust() {
            TestDistribution::Normal
        } else {
            TestDistribution::StudentT
        })
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.confidence_level <= 0.0 || self.confidence_level >= 1.0 {
            return Err(OptionsError::InvalidConfidenceLevel(self.confidence_level));
        }
        if self.rank_tolerance.is_nan() || self.rank_tolerance <= 0.0 {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

/// Builder for `RegressionOptions`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    /// Set the confidence level for confidence intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the covariance estimator.
    pub fn covariance(mut self, covariance: CovarianceType) -> Self {
        self.options.covariance = covariance;
        self
    }

    /// Force the test distribution.
    pub fn distribution(mut self, distribution: TestDistribution) -> Self {
        self.options.distribution = Some(distribution);
        self
    }

    /// Set the missing value policy.
    pub fn na_action(mut self, action: NaAction) -> Self {
        self.options.na_action = action;
        self
    }

    /// Set the rank deficiency policy.
    pub fn rank_policy(mut self, policy: RankPolicy) -> Self {
        self.options.rank_policy = policy;
        self
    }

    /// Set the relative tolerance for dependent column detection.
    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RegressionOptions::default();
        assert!(opts.with_intercept);
        assert!(opts.compute_inference);
        assert!((opts.confidence_level - 0.95).abs() < 1e-10);
        assert_eq!(opts.covariance, CovarianceType::HC0);
        assert_eq!(opts.na_action, NaAction::Omit);
        assert_eq!(opts.rank_policy, RankPolicy::Fail);
    }

    #[test]
    fn test_builder() {
        let opts = RegressionOptions::builder()
            .with_intercept(false)
            .covariance(CovarianceType::Classical)
            .na_action(NaAction::Fail)
            .build()
            .unwrap();

        assert!(!opts.with_intercept);
        assert_eq!(opts.covariance, CovarianceType::Classical);
        assert_eq!(opts.na_action, NaAction::Fail);
    }

    #[test]
    fn test_test_distribution_defaults() {
        assert_eq!(
            RegressionOptions::default().test_distribution(),
            TestDistribution::Normal
        );
        assert_eq!(
            RegressionOptions::classical().test_distribution(),
            TestDistribution::StudentT
        );

        let forced = RegressionOptions::builder()
            .distribution(TestDistribution::StudentT)
            .build_unchecked();
        assert_eq!(forced.test_distribution(), TestDistribution::StudentT);
    }

    #[test]
    fn test_validation_invalid_confidence_level() {
        let result = RegressionOptions::builder().confidence_level(1.0).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidConfidenceLevel(_))
        ));

        let result = RegressionOptions::builder().confidence_level(0.0).build();
        assert!(matches!(
            result,
            Err(OptionsError::InvalidConfidenceLevel(_))
        ));
    }

    #[test]
    fn test_validation_invalid_rank_tolerance() {
        let result = RegressionOptions::builder().rank_tolerance(0.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidRankTolerance(_))));
    }

    #[test]
    fn test_covariance_labels() {
        assert!(!CovarianceType::Classical.is_robust());
        assert!(CovarianceType::HC3.is_robust());
        assert_eq!(CovarianceType::HC0.label(), "HC0");
        assert_eq!(CovarianceType::Classical.label(), "nonrobust");
    }
}
