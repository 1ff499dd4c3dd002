//! Linear regression tables for applied econometrics.
//!
//! OLS with heteroskedasticity-robust inference (HC0 by default), two-stage
//! least squares with first-stage diagnostics, dummy-variable encoding and
//! side-by-side summary tables with significance stars.
//!
//! # Example
//!
//! ```
//! use ivreg::prelude::*;
//!
//! let csv = "\
//! y,x,w
//! 1.1,1,0.3
//! 2.3,2,0.1
//! 2.8,3,0.7
//! 4.2,4,0.2
//! 4.9,5,0.9
//! 6.1,6,0.4
//! ";
//! let data = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
//!
//! let small = ModelSpec::new("y", ["x"]);
//! let large = small.extend(["w"]);
//!
//! let ols = OlsRegressor::builder().build();
//! let fit1 = ols.fit_dataset(&data, &small).unwrap();
//! let fit2 = ols.fit_dataset(&data, &large).unwrap();
//!
//! let table = SummaryTable::builder()
//!     .models([fit1.result(), fit2.result()])
//!     .regressor_order(["const", "x"])
//!     .with_default_info()
//!     .build()
//!     .unwrap();
//! println!("{table}");
//! ```

pub mod core;
pub mod data;
pub mod inference;
pub mod solvers;
pub mod summary;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CovarianceType, IntervalType, NaAction, NaError, NaInfo, PredictionResult, RankPolicy,
        RegressionOptions, RegressionOptionsBuilder, RegressionResult, TestDistribution,
    };
    pub use crate::data::{
        CategoryOrder, Column, DataError, Dataset, Design, DummyEncoder, DummyEncoding, IvDesign,
        IvSpec, ModelSpec,
    };
    pub use crate::inference::WaldTest;
    pub use crate::solvers::{
        FirstStage, FirstStageDiagnostics, FittedIv, FittedOls, FittedRegressor, IvRegressor,
        OlsRegressor, RegressionError, Regressor,
    };
    pub use crate::summary::{significance_stars, SummaryError, SummaryTable};
}

pub use crate::core::{CovarianceType, RegressionOptions, RegressionResult};
pub use crate::data::{Dataset, ModelSpec};
pub use crate::solvers::{FittedRegressor, IvRegressor, OlsRegressor, RegressionError, Regressor};
pub use crate::summary::SummaryTable;
