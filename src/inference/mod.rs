//! Statistical inference (covariance estimators, standard errors, p-values,
//! confidence intervals, Wald tests).

mod coefficient;
mod covariance;
mod prediction;
mod wald;

pub use coefficient::{critical_value, two_sided_p_value, CoefficientInference};
pub use covariance::{coefficient_covariance, leverage};
pub use prediction::compute_prediction_intervals;
pub use wald::WaldTest;
