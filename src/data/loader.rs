//! CSV ingestion.
//!
//! Every cell is read as text first; a column becomes numeric when all of its
//! non-missing cells parse as `f64`, otherwise it stays categorical.

use super::dataset::{Column, DataError, Dataset};
use std::io::Read;
use std::path::Path;

/// Cell values treated as missing, compared ignoring ASCII case.
pub const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", ".", "null"];

impl Dataset {
    /// Load a dataset from a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        log::debug!("loading dataset from {}", path.display());
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_records(reader)
    }

    /// Load a dataset from any CSV byte source with a header row.
    ///
    /// Remote sources are fetched by the caller and passed in as a reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_records(reader)
    }

    fn from_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DataError> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (j, field) in record.iter().enumerate() {
                let cell = if is_missing(field) {
                    None
                } else {
                    Some(field.to_string())
                };
                cells[j].push(cell);
            }
        }

        let mut dataset = Dataset::new();
        for (name, column) in headers.into_iter().zip(cells) {
            dataset.push_column(name, infer_column(column))?;
        }
        log::debug!(
            "loaded {} rows x {} columns",
            dataset.n_rows(),
            dataset.n_columns()
        );
        Ok(dataset)
    }
}

fn is_missing(field: &str) -> bool {
    MISSING_TOKENS
        .iter()
        .any(|token| token.eq_ignore_ascii_case(field))
}

fn infer_column(cells: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            // NaN spellings outside the token list still count as missing
            Some(text) => text
                .parse::<f64>()
                .ok()
                .map(|value| (!value.is_nan()).then_some(value)),
        })
        .collect();

    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Categorical(cells),
    }
}
