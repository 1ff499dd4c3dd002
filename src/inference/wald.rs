//! Wald tests of zero restrictions on coefficient subsets.

use crate::utils::invert;
use faer::{Col, Mat};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

/// Wald test that a set of coefficients is jointly zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaldTest {
    /// χ² statistic β_S' V_S⁻¹ β_S.
    pub statistic: f64,
    /// Number of restrictions.
    pub df: usize,
    /// P-value from the χ²(df) distribution.
    pub p_value: f64,
}

impl WaldTest {
    /// Test `coefficients[indices] = 0` using `covariance`.
    ///
    /// Returns `None` when `indices` is empty or the covariance block is singular.
    pub fn zero_restrictions(
        coefficients: &Col<f64>,
        covariance: &Mat<f64>,
        indices: &[usize],
    ) -> Option<Self> {
        let q = indices.len();
        if q == 0 {
            return None;
        }

        let beta = Col::from_fn(q, |a| coefficients[indices[a]]);
        let block = Mat::from_fn(q, q, |a, b| covariance[(indices[a], indices[b])]);
        if beta.iter().any(|b| !b.is_finite()) {
            return None;
        }

        let block_inv = invert(&block)?;
        let mut statistic = 0.0;
        for a in 0..q {
            for b in 0..q {
                statistic += beta[a] * block_inv[(a, b)] * beta[b];
            }
        }

        let p_value = ChiSquared::new(q as f64)
            .ok()
            .map_or(f64::NAN, |d| 1.0 - d.cdf(statistic));

        Some(Self {
            statistic,
            df: q,
            p_value,
        })
    }

    /// F form of the statistic (χ² / df).
    pub fn f_statistic(&self) -> f64 {
        self.statistic / self.df as f64
    }

    /// P-value of the F form against F(df, `df_denominator`).
    pub fn f_pvalue(&self, df_denominator: usize) -> f64 {
        if df_denominator == 0 {
            return f64::NAN;
        }
        FisherSnedecor::new(self.df as f64, df_denominator as f64)
            .ok()
            .map_or(f64::NAN, |d| 1.0 - d.cdf(self.f_statistic()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_restriction_is_squared_z() {
        let beta = Col::from_fn(2, |j| [1.0, 0.5][j]);
        let mut cov = Mat::zeros(2, 2);
        cov[(0, 0)] = 1.0;
        cov[(1, 1)] = 0.0625; // se = 0.25

        let test = WaldTest::zero_restrictions(&beta, &cov, &[1]).expect("test");
        assert!((test.statistic - 4.0).abs() < 1e-12);
        assert_eq!(test.df, 1);
        // P(χ²₁ > 4) = P(|Z| > 2)
        assert!((test.p_value - 0.04550026389635842).abs() < 1e-8);
    }

    #[test]
    fn test_empty_restrictions() {
        let beta = Col::zeros(1);
        let cov = Mat::zeros(1, 1);
        assert!(WaldTest::zero_restrictions(&beta, &cov, &[]).is_none());
    }

    #[test]
    fn test_f_form() {
        let test = WaldTest {
            statistic: 6.0,
            df: 2,
            p_value: 0.0,
        };
        assert!((test.f_statistic() - 3.0).abs() < 1e-12);
        let p = test.f_pvalue(100);
        assert!(p > 0.0 && p < 0.1);
    }
}
