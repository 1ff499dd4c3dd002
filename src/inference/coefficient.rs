//! Coefficient inference calculations.

use crate::core::TestDistribution;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors from the diagonal of a coefficient covariance matrix.
    ///
    /// Aliased coefficients and negative variances yield NaN.
    pub fn standard_errors(covariance: &Mat<f64>, aliased: &[bool]) -> Col<f64> {
        Col::from_fn(covariance.nrows(), |j| {
            let var = covariance[(j, j)];
            if aliased[j] || var.is_nan() || var < 0.0 {
                f64::NAN
            } else {
                var.sqrt()
            }
        })
    }

    /// Compute test statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                f64::NAN
            } else {
                coefficients[j] / std_errors[j]
            }
        })
    }

    /// Two-sided p-values from test statistics.
    ///
    /// p_j = 2 * P(|T| > |t_j|) where T follows `distribution` (t with `df` degrees of freedom
    /// or standard normal).
    pub fn p_values(t_statistics: &Col<f64>, distribution: TestDistribution, df: f64) -> Col<f64> {
        Col::from_fn(t_statistics.nrows(), |j| {
            let t = t_statistics[j];
            if t.is_nan() {
                f64::NAN
            } else {
                two_sided_p_value(t, distribution, df)
            }
        })
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± q_{1-α/2} * SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        distribution: TestDistribution,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let q = critical_value(distribution, df, confidence_level);
        let n = coefficients.nrows();

        let lower = Col::from_fn(n, |j| coefficients[j] - q * std_errors[j]);
        let upper = Col::from_fn(n, |j| coefficients[j] + q * std_errors[j]);
        (lower, upper)
    }
}

/// Two-sided p-value of a test statistic.
pub fn two_sided_p_value(statistic: f64, distribution: TestDistribution, df: f64) -> f64 {
    let abs_t = statistic.abs();
    match distribution {
        TestDistribution::Normal => Normal::new(0.0, 1.0)
            .ok()
            .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(abs_t))),
        TestDistribution::StudentT => {
            if df <= 0.0 {
                return f64::NAN;
            }
            StudentsT::new(0.0, 1.0, df)
                .ok()
                .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(abs_t)))
        }
    }
}

/// Two-sided critical value for a confidence level.
pub fn critical_value(distribution: TestDistribution, df: f64, confidence_level: f64) -> f64 {
    let p = 1.0 - (1.0 - confidence_level) / 2.0;
    match distribution {
        TestDistribution::Normal => Normal::new(0.0, 1.0)
            .ok()
            .map_or(f64::NAN, |d| d.inverse_cdf(p)),
        TestDistribution::StudentT => {
            if df <= 0.0 {
                return f64::NAN;
            }
            StudentsT::new(0.0, 1.0, df)
                .ok()
                .map_or(f64::NAN, |d| d.inverse_cdf(p))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_statistics() {
        let coefficients = Col::from_fn(3, |i| (i + 1) as f64);
        let std_errors = Col::from_fn(3, |_| 0.5);

        let t_stats = CoefficientInference::t_statistics(&coefficients, &std_errors);

        assert!((t_stats[0] - 2.0).abs() < 1e-10);
        assert!((t_stats[1] - 4.0).abs() < 1e-10);
        assert!((t_stats[2] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_p_values_bounds() {
        let t_stats = Col::from_fn(3, |i| (i + 1) as f64);
        for dist in [TestDistribution::StudentT, TestDistribution::Normal] {
            let p_vals = CoefficientInference::p_values(&t_stats, dist, 10.0);
            for p in p_vals.iter() {
                assert!(*p >= 0.0 && *p <= 1.0);
            }
        }
    }

    #[test]
    fn test_normal_p_value_known_quantile() {
        // |z| = 1.959964 gives p = 0.05
        let p = two_sided_p_value(1.959963984540054, TestDistribution::Normal, f64::NAN);
        assert!((p - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_t_heavier_tails_than_normal() {
        let p_t = two_sided_p_value(2.0, TestDistribution::StudentT, 5.0);
        let p_z = two_sided_p_value(2.0, TestDistribution::Normal, 5.0);
        assert!(p_t > p_z);
    }

    #[test]
    fn test_standard_errors_respect_aliased() {
        let mut cov = Mat::zeros(2, 2);
        cov[(0, 0)] = 4.0;
        cov[(1, 1)] = 9.0;

        let se = CoefficientInference::standard_errors(&cov, &[false, true]);
        assert!((se[0] - 2.0).abs() < 1e-12);
        assert!(se[1].is_nan());
    }

    #[test]
    fn test_critical_value_normal() {
        let q = critical_value(TestDistribution::Normal, f64::NAN, 0.95);
        assert!((q - 1.959963984540054).abs() < 1e-9);
    }
}
