//! Indicator (dummy) encoding of categorical columns.

use super::dataset::{Column, DataError, Dataset};
use faer::Mat;

/// Order of the generated indicator columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Numeric order when every label parses as a number, lexicographic otherwise.
    #[default]
    Sorted,
    /// Order of first appearance in the data.
    FirstSeen,
}

/// Expands a categorical column into 0/1 indicator columns.
///
/// # Example
///
/// ```
/// use ivreg::data::{Column, DummyEncoder};
///
/// let column = Column::from_labels([Some("b"), Some("a"), Some("b")]);
/// let encoding = DummyEncoder::new().encode("grp", &column);
///
/// assert_eq!(encoding.column_names, vec!["grp_a", "grp_b"]);
/// assert_eq!(encoding.indicators[(0, 1)], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyEncoder {
    pub order: CategoryOrder,
    /// Column-name prefix; defaults to the source column name.
    pub prefix: Option<String>,
    pub separator: String,
    /// Omit the first category, leaving it as the reference level.
    pub drop_first: bool,
}

impl Default for DummyEncoder {
    fn default() -> Self {
        Self {
            order: CategoryOrder::Sorted,
            prefix: None,
            separator: "_".to_string(),
            drop_first: false,
        }
    }
}

/// Output of [`DummyEncoder::encode`].
#[derive(Debug, Clone)]
pub struct DummyEncoding {
    /// Source column name.
    pub source: String,
    /// Categories with an indicator column, in column order.
    pub categories: Vec<String>,
    /// Generated column names, parallel to `categories`.
    pub column_names: Vec<String>,
    /// n × m indicator matrix; rows with a missing label are NaN throughout.
    pub indicators: Mat<f64>,
    /// Original labels.
    pub labels: Vec<Option<String>>,
}

impl DummyEncoding {
    pub fn n_indicators(&self) -> usize {
        self.column_names.len()
    }

    /// Indicator values of one generated column.
    pub fn indicator(&self, j: usize) -> Vec<f64> {
        (0..self.indicators.nrows())
            .map(|i| self.indicators[(i, j)])
            .collect()
    }
}

impl DummyEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: CategoryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    /// Encode `column`, naming the indicators after `name`.
    pub fn encode(&self, name: &str, column: &Column) -> DummyEncoding {
        let labels: Vec<Option<String>> = (0..column.len()).map(|i| column.label(i)).collect();

        let mut categories = self.categories(&labels);
        if self.drop_first && !categories.is_empty() {
            categories.remove(0);
        }

        let prefix = self.prefix.as_deref().unwrap_or(name);
        let column_names = categories
            .iter()
            .map(|c| format!("{prefix}{}{c}", self.separator))
            .collect();

        let indicators = Mat::from_fn(labels.len(), categories.len(), |i, j| match &labels[i] {
            Some(label) if *label == categories[j] => 1.0,
            Some(_) => 0.0,
            None => f64::NAN,
        });

        DummyEncoding {
            source: name.to_string(),
            categories,
            column_names,
            indicators,
            labels,
        }
    }

    fn categories(&self, labels: &[Option<String>]) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for label in labels.iter().flatten() {
            if !seen.contains(label) {
                seen.push(label.clone());
            }
        }

        if self.order == CategoryOrder::Sorted {
            let numeric: Option<Vec<f64>> = seen.iter().map(|s| s.parse::<f64>().ok()).collect();
            match numeric {
                Some(values) => {
                    let mut paired: Vec<(f64, String)> = values.into_iter().zip(seen).collect();
                    paired.sort_by(|a, b| a.0.total_cmp(&b.0));
                    seen = paired.into_iter().map(|(_, s)| s).collect();
                }
                None => seen.sort(),
            }
        }
        seen
    }
}

impl Dataset {
    /// Encode `column` and append its indicators as numeric columns.
    ///
    /// Nothing is appended if any generated name already exists.
    pub fn add_dummies(
        &mut self,
        column: &str,
        encoder: &DummyEncoder,
    ) -> Result<DummyEncoding, DataError> {
        let encoding = encoder.encode(column, self.column(column)?);

        if let Some(taken) = encoding
            .column_names
            .iter()
            .find(|name| self.has_column(name))
        {
            return Err(DataError::DuplicateColumn(taken.clone()));
        }

        for (j, name) in encoding.column_names.iter().enumerate() {
            self.push_column(name.clone(), Column::from_f64(encoding.indicator(j)))?;
        }
        log::debug!(
            "added {} indicator columns for '{}'",
            encoding.n_indicators(),
            column
        );
        Ok(encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_labels_sort_numerically() {
        let column = Column::from_f64([10.0, 2.0, 1.0, 2.0]);
        let encoding = DummyEncoder::new().encode("g", &column);
        assert_eq!(encoding.categories, vec!["1", "2", "10"]);
        assert_eq!(encoding.column_names, vec!["g_1", "g_2", "g_10"]);
    }

    #[test]
    fn test_first_seen_order() {
        let column = Column::from_labels([Some("c"), Some("a"), Some("c"), Some("b")]);
        let encoding = DummyEncoder::new()
            .order(CategoryOrder::FirstSeen)
            .encode("g", &column);
        assert_eq!(encoding.categories, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_label_is_nan_row() {
        let column = Column::from_labels([Some("a"), None, Some("b")]);
        let encoding = DummyEncoder::new().encode("g", &column);
        assert!(encoding.indicators[(1, 0)].is_nan());
        assert!(encoding.indicators[(1, 1)].is_nan());
        assert_eq!(encoding.labels[1], None);
    }

    #[test]
    fn test_drop_first_and_prefix() {
        let column = Column::from_labels([Some("a"), Some("b"), Some("c")]);
        let encoding = DummyEncoder::new()
            .drop_first(true)
            .prefix("region")
            .separator(":")
            .encode("g", &column);
        assert_eq!(encoding.column_names, vec!["region:b", "region:c"]);
        assert_eq!(encoding.indicator(0), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_single_category() {
        let column = Column::from_labels([Some("only"), Some("only")]);
        let encoding = DummyEncoder::new().encode("g", &column);
        assert_eq!(encoding.n_indicators(), 1);
        assert_eq!(encoding.indicator(0), vec![1.0, 1.0]);
    }

    #[test]
    fn test_add_dummies_rejects_name_clash() {
        let mut data = Dataset::new()
            .with_column("g", Column::from_labels([Some("a"), Some("b")]))
            .unwrap()
            .with_numeric("g_a", [0.0, 0.0])
            .unwrap();
        assert!(matches!(
            data.add_dummies("g", &DummyEncoder::new()),
            Err(DataError::DuplicateColumn(name)) if name == "g_a"
        ));
        assert_eq!(data.n_columns(), 2);
    }
}
