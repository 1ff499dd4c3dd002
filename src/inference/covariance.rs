//! Coefficient covariance estimators.
//!
//! Every estimator is expressed through the *bread* matrix `B`, the k × n linear
//! map from the response to the coefficients (β = B y). For a full-rank OLS
//! design `B = (X'X)⁻¹X'`, for 2SLS `B = (X̂'X̂)⁻¹X̂'`, and for a rank-deficient
//! design solved by pseudo-inverse `B = X⁺`. Then
//!
//! - classical: `σ² B B'`
//! - HC0..HC3: `B diag(ωᵢ uᵢ²) B'` with the usual small-sample weights ωᵢ.

use crate::core::CovarianceType;
use faer::{Col, Mat};

/// Leverage hᵢ = xᵢ' bᵢ, the diagonal of the hat matrix `X B`.
pub fn leverage(design: &Mat<f64>, bread: &Mat<f64>) -> Col<f64> {
    let k = design.ncols();
    Col::from_fn(design.nrows(), |i| {
        (0..k).map(|j| design[(i, j)] * bread[(j, i)]).sum()
    })
}

/// Coefficient covariance matrix.
///
/// # Arguments
/// * `bread` - k × n matrix with β = B y
/// * `residuals` - residuals used in the meat (structural residuals for 2SLS)
/// * `leverage` - hat values, only read by HC2 and HC3
/// * `kind` - estimator
/// * `mse` - residual variance, only read by the classical estimator
/// * `n_params` - number of estimated parameters, only read by HC1
pub fn coefficient_covariance(
    bread: &Mat<f64>,
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    kind: CovarianceType,
    mse: f64,
    n_params: usize,
) -> Mat<f64> {
    let k = bread.nrows();
    let n = bread.ncols();

    // B' as an owned n × k matrix
    let bread_t = Mat::from_fn(n, k, |i, j| bread[(j, i)]);

    match kind {
        CovarianceType::Classical => {
            let gram = bread_t.transpose() * &bread_t;
            Mat::from_fn(k, k, |i, j| mse * gram[(i, j)])
        }
        _ => {
            let weights = meat_weights(residuals, leverage, kind, n_params);
            let weighted = Mat::from_fn(n, k, |i, j| weights[i] * bread_t[(i, j)]);
            bread_t.transpose() * &weighted
        }
    }
}

/// Per-observation weights ωᵢ uᵢ² of the sandwich meat.
fn meat_weights(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    kind: CovarianceType,
    n_params: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    let hc1_scale = if n > n_params {
        n as f64 / (n - n_params) as f64
    } else {
        f64::NAN
    };

    Col::from_fn(n, |i| {
        let u2 = residuals[i] * residuals[i];
        match kind {
            CovarianceType::Classical | CovarianceType::HC0 => u2,
            CovarianceType::HC1 => u2 * hc1_scale,
            CovarianceType::HC2 => u2 / (1.0 - leverage[i]),
            CovarianceType::HC3 => u2 / (1.0 - leverage[i]).powi(2),
        }
    })
}
