//! Regression solvers: ordinary least squares and two-stage least squares.

mod iv;
mod least_squares;
mod ols;
mod traits;

pub use iv::{
    FirstStage, FirstStageDiagnostics, FittedIv, IvRegressor, IvRegressorBuilder,
    WEAK_INSTRUMENT_THRESHOLD,
};
pub use ols::{FittedOls, OlsRegressor, OlsRegressorBuilder};
pub use traits::{FittedRegressor, RegressionError, Regressor};
