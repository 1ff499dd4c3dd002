//! Model specifications and the materialised matrices they select.

use faer::{Col, Mat};

/// Response plus an ordered set of regressors.
///
/// Nested specifications are built with [`extend`](Self::extend):
///
/// ```
/// use ivreg::data::ModelSpec;
///
/// let base = ModelSpec::new("logpgp95", ["const", "avexpr"]);
/// let wider = base.extend(["lat_abst"]);
/// assert_eq!(wider.regressors, vec!["const", "avexpr", "lat_abst"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub response: String,
    pub regressors: Vec<String>,
}

impl ModelSpec {
    pub fn new<S: Into<String>>(
        response: impl Into<String>,
        regressors: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            response: response.into(),
            regressors: regressors.into_iter().map(Into::into).collect(),
        }
    }

    /// A copy of this specification with extra regressors appended.
    ///
    /// Names already present are not repeated.
    pub fn extend<S: Into<String>>(&self, more: impl IntoIterator<Item = S>) -> Self {
        let mut spec = self.clone();
        for name in more.into_iter().map(Into::into) {
            if !spec.regressors.contains(&name) {
                spec.regressors.push(name);
            }
        }
        spec
    }
}

/// Column roles of an instrumental-variables model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IvSpec {
    pub response: String,
    /// Included exogenous regressors (instrument themselves).
    pub exogenous: Vec<String>,
    /// Endogenous regressors to be instrumented.
    pub endogenous: Vec<String>,
    /// Excluded instruments.
    pub instruments: Vec<String>,
}

impl IvSpec {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Self::default()
        }
    }

    pub fn exogenous<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exogenous = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn endogenous<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.endogenous = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn instruments<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.instruments = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Response vector and design matrix with column names. Missing values are NaN.
#[derive(Debug, Clone)]
pub struct Design {
    pub response: String,
    pub regressors: Vec<String>,
    pub x: Mat<f64>,
    pub y: Col<f64>,
}

impl Design {
    /// Wrap raw matrices, naming the columns `x0`, `x1`, ….
    pub fn from_matrix(x: Mat<f64>, y: Col<f64>) -> Self {
        Self {
            response: "y".to_string(),
            regressors: default_names(x.ncols()),
            x,
            y,
        }
    }

    pub fn n_observations(&self) -> usize {
        self.y.nrows()
    }
}

/// Materialised blocks of an instrumental-variables model.
#[derive(Debug, Clone)]
pub struct IvDesign {
    pub response: String,
    pub exogenous: Vec<String>,
    pub endogenous: Vec<String>,
    pub instruments: Vec<String>,
    pub y: Col<f64>,
    pub x_exog: Mat<f64>,
    pub x_endog: Mat<f64>,
    pub z: Mat<f64>,
}

impl IvDesign {
    /// Wrap raw matrices with generated names (`w0…`, `x0…`, `z0…`).
    pub fn from_matrices(y: Col<f64>, x_exog: Mat<f64>, x_endog: Mat<f64>, z: Mat<f64>) -> Self {
        let prefixed = |prefix: &str, n: usize| (0..n).map(|j| format!("{prefix}{j}")).collect();
        Self {
            response: "y".to_string(),
            exogenous: prefixed("w", x_exog.ncols()),
            endogenous: prefixed("x", x_endog.ncols()),
            instruments: prefixed("z", z.ncols()),
            y,
            x_exog,
            x_endog,
            z,
        }
    }

    pub fn n_observations(&self) -> usize {
        self.y.nrows()
    }
}

pub(crate) fn default_names(n: usize) -> Vec<String> {
    (0..n).map(|j| format!("x{j}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_skips_duplicates() {
        let spec = ModelSpec::new("y", ["const", "a"]).extend(["a", "b"]);
        assert_eq!(spec.regressors, vec!["const", "a", "b"]);
        assert_eq!(spec.response, "y");
    }

    #[test]
    fn test_iv_spec_builder() {
        let spec = IvSpec::new("y")
            .exogenous(["const"])
            .endogenous(["avexpr"])
            .instruments(["logem4"]);
        assert_eq!(spec.endogenous, vec!["avexpr"]);
        assert_eq!(spec.instruments, vec!["logem4"]);
    }

    #[test]
    fn test_from_matrix_names() {
        let design = Design::from_matrix(Mat::zeros(4, 2), Col::zeros(4));
        assert_eq!(design.regressors, vec!["x0", "x1"]);
        assert_eq!(design.n_observations(), 4);
    }
}
