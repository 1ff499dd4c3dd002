//! Missing value (NaN) handling for regression analysis.
//!
//! Three policies are supported:
//! - `Omit`: drop rows with a missing value; outputs are shorter than the input
//! - `Exclude`: drop like `Omit`, but outputs can be padded back to the input length
//! - `Fail`: return an error if any selected row has a missing value
//!
//! # Example
//!
//! ```
//! use ivreg::core::{NaAction, NaHandler};
//! use faer::{Mat, Col};
//!
//! let x = Mat::from_fn(5, 2, |i, j| if i == 2 { f64::NAN } else { (i + j) as f64 });
//! let y = Col::from_fn(5, |i| if i == 3 { f64::NAN } else { i as f64 });
//!
//! let result = NaHandler::process(&x, &y, NaAction::Omit).unwrap();
//! assert_eq!(result.x_clean.nrows(), 3); // Rows 0, 1, 4 kept
//! assert_eq!(result.na_info.n_removed, 2);
//! ```

use faer::{Col, Mat};
use thiserror::Error;

/// Action to take when missing values are encountered in the selected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NaAction {
    /// Drop incomplete rows. Residuals and fitted values cover the kept rows only.
    #[default]
    Omit,

    /// Drop incomplete rows, but remember their positions so that residuals
    /// and fitted values can be expanded back to the input length.
    Exclude,

    /// Refuse to fit when any selected row is incomplete.
    Fail,
}

/// Errors raised while applying an `NaAction`.
#[derive(Debug, Error)]
pub enum NaError {
    /// Missing values found with `NaAction::Fail`.
    #[error("missing values found in {n_na} rows (na_action = fail)")]
    NaValuesPresent { n_na: usize },

    /// Every row contained a missing value.
    #[error("all observations contain missing values")]
    AllNa,
}

/// Record of the rows removed before fitting.
#[derive(Debug, Clone)]
pub struct NaInfo {
    /// Number of rows before removal.
    pub n_original: usize,

    /// Number of rows after removal.
    pub n_clean: usize,

    /// `true` for rows that were removed.
    pub na_mask: Vec<bool>,

    /// Original indices of the kept rows.
    pub kept_indices: Vec<usize>,

    /// Number of removed rows.
    pub n_removed: usize,

    /// The policy that was applied.
    pub action: NaAction,
}

impl NaInfo {
    /// Check if any rows were removed.
    pub fn has_removed(&self) -> bool {
        self.n_removed > 0
    }

    /// Whether outputs should be padded back to the original length.
    pub fn needs_expansion(&self) -> bool {
        self.action == NaAction::Exclude && self.n_removed > 0
    }

    /// Expand a vector over the kept rows to the original length, with NaN at removed rows.
    pub fn expand(&self, clean_values: &Col<f64>) -> Col<f64> {
        if !self.needs_expansion() {
            return clean_values.clone();
        }

        let mut expanded = Col::from_fn(self.n_original, |_| f64::NAN);
        for (clean_idx, &orig_idx) in self.kept_indices.iter().enumerate() {
            expanded[orig_idx] = clean_values[clean_idx];
        }
        expanded
    }

    /// Info for data without missing values.
    pub fn no_na(n_observations: usize, action: NaAction) -> Self {
        Self {
            n_original: n_observations,
            n_clean: n_observations,
            na_mask: vec![false; n_observations],
            kept_indices: (0..n_observations).collect(),
            n_removed: 0,
            action,
        }
    }
}

/// Result of missing value preprocessing.
#[derive(Debug, Clone)]
pub struct NaResult {
    /// Design matrix restricted to complete rows.
    pub x_clean: Mat<f64>,

    /// Response restricted to complete rows.
    pub y_clean: Col<f64>,

    /// Which rows were removed.
    pub na_info: NaInfo,
}

/// Handler for missing value processing.
pub struct NaHandler;

impl NaHandler {
    /// Apply `action` to a design matrix and response.
    ///
    /// # Errors
    ///
    /// - `NaError::NaValuesPresent` if `action` is `Fail` and a row is incomplete
    /// - `NaError::AllNa` if every row is incomplete
    pub fn process(x: &Mat<f64>, y: &Col<f64>, action: NaAction) -> Result<NaResult, NaError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let na_mask = Self::find_na_rows(x, y);
        let n_na = na_mask.iter().filter(|&&v| v).count();

        if n_na == 0 {
            return Ok(NaResult {
                x_clean: x.clone(),
                y_clean: y.clone(),
                na_info: NaInfo::no_na(n_samples, action),
            });
        }

        match action {
            NaAction::Fail => Err(NaError::NaValuesPresent { n_na }),

            NaAction::Omit | NaAction::Exclude => {
                if n_na == n_samples {
                    return Err(NaError::AllNa);
                }

                let kept_indices: Vec<usize> = na_mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &had_na)| if !had_na { Some(i) } else { None })
                    .collect();

                let n_clean = kept_indices.len();
                log::info!(
                    "dropped {} of {} rows with missing values ({} remain)",
                    n_na,
                    n_samples,
                    n_clean
                );

                let x_clean = Mat::from_fn(n_clean, n_features, |i, j| x[(kept_indices[i], j)]);
                let y_clean = Col::from_fn(n_clean, |i| y[kept_indices[i]]);

                Ok(NaResult {
                    x_clean,
                    y_clean,
                    na_info: NaInfo {
                        n_original: n_samples,
                        n_clean,
                        na_mask,
                        kept_indices,
                        n_removed: n_na,
                        action,
                    },
                })
            }
        }
    }

    /// Rows with a NaN in `y` or any column of `x`.
    fn find_na_rows(x: &Mat<f64>, y: &Col<f64>) -> Vec<bool> {
        (0..x.nrows())
            .map(|i| y[i].is_nan() || (0..x.ncols()).any(|j| x[(i, j)].is_nan()))
            .collect()
    }

    /// Check if a matrix contains any missing values.
    pub fn has_na_matrix(x: &Mat<f64>) -> bool {
        (0..x.ncols()).any(|j| (0..x.nrows()).any(|i| x[(i, j)].is_nan()))
    }

    /// Check if a vector contains any missing values.
    pub fn has_na_vector(v: &Col<f64>) -> bool {
        v.iter().any(|&x| x.is_nan())
    }
}
