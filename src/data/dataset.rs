//! In-memory tabular dataset with named numeric and categorical columns.

use super::design::{Design, IvDesign, IvSpec, ModelSpec};
use faer::{Col, Mat};
use thiserror::Error;

/// Name of the derived intercept column added by [`Dataset::add_constant`].
pub const CONSTANT_COLUMN: &str = "const";

/// Errors raised while building or querying a dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("column '{0}' is categorical; a numeric column is required")]
    NotNumeric(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A single dataset column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Numeric column from raw values, treating NaN as missing.
    pub fn from_f64(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Numeric(
            values
                .into_iter()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        )
    }

    /// Categorical column from labels.
    pub fn from_labels<S: Into<String>>(labels: impl IntoIterator<Item = Option<S>>) -> Self {
        Column::Categorical(labels.into_iter().map(|l| l.map(Into::into)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Number of missing entries.
    pub fn n_missing(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            Column::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Display label of row `i`; numbers print without a trailing `.0`.
    pub fn label(&self, i: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v[i].map(|x| format!("{x}")),
            Column::Categorical(v) => v[i].clone(),
        }
    }
}

/// Ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (zero for a dataset without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append a column.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), DataError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DataError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(DataError::LengthMismatch {
                column: name,
                expected: self.n_rows(),
                got: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style [`push_column`](Self::push_column).
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, DataError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Builder-style numeric column; NaN marks a missing value.
    pub fn with_numeric(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
    ) -> Result<Self, DataError> {
        self.with_column(name, Column::from_f64(values))
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| &self.columns[j])
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Numeric column values with NaN for missing entries.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, DataError> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
            Column::Categorical(_) => Err(DataError::NotNumeric(name.to_string())),
        }
    }

    /// Add the `const` column of ones used for intercept estimation.
    ///
    /// A no-op if a `const` column of ones is already present.
    pub fn add_constant(&mut self) -> Result<(), DataError> {
        if let Ok(existing) = self.column(CONSTANT_COLUMN) {
            let all_ones = match existing {
                Column::Numeric(v) => v.iter().all(|x| *x == Some(1.0)),
                Column::Categorical(_) => false,
            };
            return if all_ones {
                Ok(())
            } else {
                Err(DataError::DuplicateColumn(CONSTANT_COLUMN.to_string()))
            };
        }
        let n = self.n_rows();
        self.push_column(CONSTANT_COLUMN, Column::Numeric(vec![Some(1.0); n]))
    }

    /// Materialise the response and design matrix of a model specification.
    ///
    /// Missing values become NaN; rows are not dropped here.
    pub fn design(&self, spec: &ModelSpec) -> Result<Design, DataError> {
        self.ensure_columns(std::iter::once(&spec.response).chain(spec.regressors.iter()))?;

        let y = Col::from_fn(self.n_rows(), {
            let values = self.numeric(&spec.response)?;
            move |i| values[i]
        });
        let x = self.matrix(&spec.regressors)?;

        Ok(Design {
            response: spec.response.clone(),
            regressors: spec.regressors.clone(),
            x,
            y,
        })
    }

    /// Materialise the blocks of an instrumental-variables specification.
    pub fn iv_design(&self, spec: &IvSpec) -> Result<IvDesign, DataError> {
        self.ensure_columns(
            std::iter::once(&spec.response)
                .chain(spec.exogenous.iter())
                .chain(spec.endogenous.iter())
                .chain(spec.instruments.iter()),
        )?;

        let response = self.numeric(&spec.response)?;
        Ok(IvDesign {
            response: spec.response.clone(),
            exogenous: spec.exogenous.clone(),
            endogenous: spec.endogenous.clone(),
            instruments: spec.instruments.clone(),
            y: Col::from_fn(self.n_rows(), |i| response[i]),
            x_exog: self.matrix(&spec.exogenous)?,
            x_endog: self.matrix(&spec.endogenous)?,
            z: self.matrix(&spec.instruments)?,
        })
    }

    fn ensure_columns<'a>(&self, names: impl Iterator<Item = &'a String>) -> Result<(), DataError> {
        for name in names {
            if !self.has_column(name) {
                return Err(DataError::MissingColumn(name.clone()));
            }
        }
        Ok(())
    }

    fn matrix(&self, names: &[String]) -> Result<Mat<f64>, DataError> {
        let columns = names
            .iter()
            .map(|name| self.numeric(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Mat::from_fn(self.n_rows(), names.len(), |i, j| columns[j][i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_numeric("y", [1.0, 2.0, f64::NAN])
            .unwrap()
            .with_numeric("x", [0.5, 1.5, 2.5])
            .unwrap()
            .with_column("region", Column::from_labels([Some("a"), None, Some("b")]))
            .unwrap()
    }

    #[test]
    fn test_shape_and_lookup() {
        let data = sample();
        assert_eq!(data.n_rows(), 3);
        assert_eq!(data.n_columns(), 3);
        assert!(data.column("x").unwrap().is_numeric());
        assert_eq!(data.column("y").unwrap().n_missing(), 1);
        assert!(matches!(
            data.column("nope"),
            Err(DataError::MissingColumn(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_push_column_validation() {
        let mut data = sample();
        assert!(matches!(
            data.push_column("x", Column::from_f64([1.0, 2.0, 3.0])),
            Err(DataError::DuplicateColumn(_))
        ));
        assert!(matches!(
            data.push_column("z", Column::from_f64([1.0])),
            Err(DataError::LengthMismatch { expected: 3, got: 1, .. })
        ));
    }

    #[test]
    fn test_add_constant_is_idempotent() {
        let mut data = sample();
        data.add_constant().unwrap();
        data.add_constant().unwrap();
        assert_eq!(data.n_columns(), 4);
        assert_eq!(data.numeric(CONSTANT_COLUMN).unwrap(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_design_missing_and_categorical_columns() {
        let data = sample();
        let err = data
            .design(&ModelSpec::new("y", ["x", "lat_abst"]))
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(name) if name == "lat_abst"));

        let err = data.design(&ModelSpec::new("y", ["region"])).unwrap_err();
        assert!(matches!(err, DataError::NotNumeric(_)));
    }

    #[test]
    fn test_design_keeps_missing_as_nan() {
        let design = sample().design(&ModelSpec::new("y", ["x"])).unwrap();
        assert_eq!(design.x.nrows(), 3);
        assert!(design.y[2].is_nan());
        assert_eq!(design.x[(1, 0)], 1.5);
    }

    #[test]
    fn test_numeric_labels() {
        let column = Column::from_f64([1.0, 2.5, f64::NAN]);
        assert_eq!(column.label(0).as_deref(), Some("1"));
        assert_eq!(column.label(1).as_deref(), Some("2.5"));
        assert_eq!(column.label(2), None);
    }
}
