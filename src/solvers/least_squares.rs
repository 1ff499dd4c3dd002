//! Least squares core shared by the OLS and 2SLS estimators.
//!
//! The solve produces the bread matrix `B` (k × n, β = B y) rather than β
//! alone, so the same factorisation feeds coefficients, leverage and every
//! covariance estimator.

use crate::core::{RankPolicy, RegressionOptions, RegressionResult};
use crate::inference::{coefficient_covariance, leverage, CoefficientInference, WaldTest};
use crate::solvers::traits::RegressionError;
use crate::utils::{
    detect_constant_columns, independent_columns, invert_upper_triangular, ones_column_index,
    select_columns,
};
use faer::{Col, Mat};

/// Factorised least squares problem.
#[derive(Debug, Clone)]
pub(crate) struct LeastSquares {
    /// k × n map from the response to the coefficients.
    pub bread: Mat<f64>,
    /// Numerical rank of the design.
    pub rank: usize,
    /// Columns whose coefficients are not estimated (`RankPolicy::Drop` only).
    pub aliased: Vec<bool>,
}

impl LeastSquares {
    /// Factorise `x`, resolving rank deficiency according to `policy`.
    pub fn decompose(
        x: &Mat<f64>,
        names: &[String],
        policy: RankPolicy,
        tolerance: f64,
    ) -> Result<Self, RegressionError> {
        let k = x.ncols();
        let independent = independent_columns(x, tolerance);
        let rank = independent.len();

        if rank == k {
            return Ok(Self {
                bread: full_rank_bread(x)?,
                rank,
                aliased: vec![false; k],
            });
        }

        let dependent: Vec<usize> = (0..k).filter(|j| !independent.contains(j)).collect();
        let dependent_names: Vec<String> = dependent.iter().map(|&j| names[j].clone()).collect();

        match policy {
            RankPolicy::Fail => Err(RegressionError::Collinear {
                columns: dependent_names,
            }),
            RankPolicy::PseudoInverse => {
                log::warn!(
                    "design is rank deficient (rank {rank} of {k}, dependent: {}); using pseudo-inverse",
                    dependent_names.join(", ")
                );
                Ok(Self {
                    bread: pseudo_inverse(x, &independent, &dependent)?,
                    rank,
                    aliased: vec![false; k],
                })
            }
            RankPolicy::Drop => {
                log::warn!(
                    "design is rank deficient; dropping aliased columns: {}",
                    dependent_names.join(", ")
                );
                let mut bread = Mat::zeros(k, x.nrows());
                if rank > 0 {
                    let reduced = full_rank_bread(&select_columns(x, &independent))?;
                    for (r, &j) in independent.iter().enumerate() {
                        for i in 0..x.nrows() {
                            bread[(j, i)] = reduced[(r, i)];
                        }
                    }
                }
                let mut aliased = vec![false; k];
                for &j in &dependent {
                    aliased[j] = true;
                }
                Ok(Self {
                    bread,
                    rank,
                    aliased,
                })
            }
        }
    }

    /// β = B y, NaN at aliased positions.
    pub fn coefficients(&self, y: &Col<f64>) -> Col<f64> {
        let n = self.bread.ncols();
        Col::from_fn(self.bread.nrows(), |j| {
            if self.aliased[j] {
                f64::NAN
            } else {
                (0..n).map(|i| self.bread[(j, i)] * y[i]).sum::<f64>()
            }
        })
    }
}

/// `R⁻¹ Q₁'` from a thin QR factorisation of a full column rank `x`.
fn full_rank_bread(x: &Mat<f64>) -> Result<Mat<f64>, RegressionError> {
    let n = x.nrows();
    let k = x.ncols();

    let qr = x.qr();
    let q = qr.compute_thin_Q();
    let r = qr.thin_R();

    let r_inv = invert_upper_triangular(r, k).ok_or(RegressionError::SingularMatrix)?;
    let q1t = Mat::from_fn(k, n, |i, j| q[(j, i)]);
    Ok(&r_inv * &q1t)
}

/// Moore–Penrose pseudo-inverse through a complete orthogonal decomposition.
///
/// With the columns permuted to `[independent | dependent]`, `X P = Q₁ L` where
/// `Q₁` spans the independent columns and `L = Q₁' X P` has full row rank. A
/// second QR of `L'` gives `L⁺ = Q₂ R₂⁻ᵀ`, so `X⁺ = P L⁺ Q₁'`.
fn pseudo_inverse(
    x: &Mat<f64>,
    independent: &[usize],
    dependent: &[usize],
) -> Result<Mat<f64>, RegressionError> {
    let n = x.nrows();
    let k = x.ncols();
    let r = independent.len();
    if r == 0 {
        return Ok(Mat::zeros(k, n));
    }

    let order: Vec<usize> = independent.iter().chain(dependent).copied().collect();
    let x_perm = select_columns(x, &order);

    let qr = select_columns(x, independent).qr();
    let q = qr.compute_thin_Q();
    let q1t = Mat::from_fn(r, n, |i, j| q[(j, i)]);

    let l = &q1t * &x_perm;
    let lt = Mat::from_fn(k, r, |i, j| l[(j, i)]);

    let qr2 = lt.qr();
    let q2 = qr2.compute_thin_Q();
    let r2_inv =
        invert_upper_triangular(qr2.thin_R(), r).ok_or(RegressionError::SingularMatrix)?;

    let l_pinv: Mat<f64> = Mat::from_fn(k, r, |i, j| {
        (0..r).map(|m| q2[(i, m)] * r2_inv[(j, m)]).sum::<f64>()
    });
    let pinv_perm = &l_pinv * &q1t;

    let mut bread = Mat::zeros(k, n);
    for (pos, &j) in order.iter().enumerate() {
        for i in 0..n {
            bread[(j, i)] = pinv_perm[(pos, i)];
        }
    }
    Ok(bread)
}

/// Everything needed to turn a solved system into a [`RegressionResult`].
pub(crate) struct LinearFit<'a> {
    pub response_name: &'a str,
    pub feature_names: Vec<String>,
    /// Regressors that define fitted values and residuals.
    pub design: &'a Mat<f64>,
    /// Matrix the bread was computed from (the design itself for OLS, the
    /// instrumented design for 2SLS).
    pub bread_design: &'a Mat<f64>,
    pub y: &'a Col<f64>,
    pub solution: &'a LeastSquares,
    pub clamp_r_squared: bool,
}

impl LinearFit<'_> {
    /// Compute coefficients, fit statistics and (optionally) inference.
    pub fn into_result(self, options: &RegressionOptions) -> RegressionResult {
        let n = self.y.nrows();
        let k = self.design.ncols();
        let solution = self.solution;
        let aliased = &solution.aliased;

        let coefficients = solution.coefficients(self.y);
        let fitted_values = Col::from_fn(n, |i| {
            (0..k)
                .filter(|&j| !aliased[j])
                .map(|j| self.design[(i, j)] * coefficients[j])
                .sum::<f64>()
        });
        let residuals = Col::from_fn(n, |i| self.y[i] - fitted_values[i]);

        let constant: Vec<bool> = detect_constant_columns(self.bread_design, 1e-12)
            .into_iter()
            .enumerate()
            .map(|(j, c)| c && n > 0 && self.bread_design[(0, j)] != 0.0)
            .collect();
        let has_constant = constant.iter().any(|&c| c);

        let rank = solution.rank;
        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let center = if has_constant {
            self.y.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };
        let tss: f64 = self.y.iter().map(|&yi| (yi - center).powi(2)).sum();

        let mut r_squared = if tss > 0.0 {
            1.0 - rss / tss
        } else if rss < 1e-10 {
            1.0
        } else {
            0.0
        };
        if self.clamp_r_squared {
            r_squared = r_squared.clamp(0.0, 1.0);
        }

        let df_resid = n.saturating_sub(rank);
        let mse = if df_resid > 0 {
            rss / df_resid as f64
        } else {
            f64::NAN
        };

        let n_centre = usize::from(has_constant);
        let adj_r_squared = if df_resid > 0 && n > n_centre {
            1.0 - (1.0 - r_squared) * (n - n_centre) as f64 / df_resid as f64
        } else {
            f64::NAN
        };

        let log_likelihood = if rss > 0.0 {
            let nf = n as f64;
            -0.5 * nf * ((2.0 * std::f64::consts::PI).ln() + (rss / nf).ln() + 1.0)
        } else {
            f64::NAN
        };
        let p = rank as f64;

        let mut result = RegressionResult::empty(self.feature_names, n);
        result.response_name = self.response_name.to_string();
        result.intercept_index = ones_column_index(self.design);
        result.has_constant = has_constant;
        result.rank = rank;
        result.n_parameters = rank;
        result.aliased = aliased.clone();
        result.rank_tolerance = options.rank_tolerance;
        result.r_squared = r_squared;
        result.adj_r_squared = adj_r_squared;
        result.mse = mse;
        result.rmse = mse.sqrt();
        result.log_likelihood = log_likelihood;
        result.aic = 2.0 * p - 2.0 * log_likelihood;
        result.bic = p * (n as f64).ln() - 2.0 * log_likelihood;
        result.covariance_type = options.covariance;
        result.distribution = options.test_distribution();
        result.confidence_level = options.confidence_level;

        if options.compute_inference && rank > 0 {
            let hat = leverage(self.bread_design, &solution.bread);
            let mut cov = coefficient_covariance(
                &solution.bread,
                &residuals,
                &hat,
                options.covariance,
                mse,
                rank,
            );
            for j in (0..k).filter(|&j| aliased[j]) {
                for m in 0..k {
                    cov[(j, m)] = f64::NAN;
                    cov[(m, j)] = f64::NAN;
                }
            }

            let df = df_resid as f64;
            let se = CoefficientInference::standard_errors(&cov, aliased);
            let stats = CoefficientInference::t_statistics(&coefficients, &se);
            let p_values = CoefficientInference::p_values(&stats, result.distribution, df);
            let (lower, upper) = CoefficientInference::confidence_intervals(
                &coefficients,
                &se,
                result.distribution,
                df,
                options.confidence_level,
            );

            let tested: Vec<usize> = (0..k).filter(|&j| !aliased[j] && !constant[j]).collect();
            if let Some(wald) = WaldTest::zero_restrictions(&coefficients, &cov, &tested) {
                result.f_statistic = wald.f_statistic();
                result.f_pvalue = wald.f_pvalue(df_resid);
            }

            result.covariance = Some(cov);
            result.std_errors = Some(se);
            result.t_statistics = Some(stats);
            result.p_values = Some(p_values);
            result.conf_interval_lower = Some(lower);
            result.conf_interval_upper = Some(upper);
        }

        result.coefficients = coefficients;
        result.fitted_values = fitted_values;
        result.residuals = residuals;
        result
    }
}
