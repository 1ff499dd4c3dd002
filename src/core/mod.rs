//! Core types for regression analysis.

mod na_action;
mod options;
mod prediction;
mod result;

pub use na_action::{NaAction, NaError, NaHandler, NaInfo, NaResult};
pub use options::{
    CovarianceType, OptionsError, RankPolicy, RegressionOptions, RegressionOptionsBuilder,
    TestDistribution,
};
pub use prediction::{IntervalType, PredictionResult};
pub use result::RegressionResult;
