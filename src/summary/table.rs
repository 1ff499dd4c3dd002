//! Side-by-side regression summary tables.

use super::stars::{significance_stars, STAR_LEGEND};
use crate::core::RegressionResult;
use comfy_table::{presets, Cell, CellAlignment, Table};
use std::fmt;
use thiserror::Error;

/// Legend line describing the second row of each coefficient pair.
pub const STD_ERROR_LEGEND: &str = "Standard errors in parentheses.";

/// Errors raised when assembling a summary table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no models to summarise")]
    NoModels,

    #[error("{names} model names given for {models} models")]
    CountMismatch { names: usize, models: usize },
}

type InfoFn = Box<dyn Fn(&RegressionResult) -> String>;

/// Statistic behind an info row. Built-in rows are formatted at build time so
/// they follow the final `decimals` setting.
enum InfoStatistic {
    RSquared,
    Observations,
    Custom(InfoFn),
}

impl InfoStatistic {
    fn cell(&self, result: &RegressionResult, decimals: usize) -> String {
        match self {
            Self::RSquared => format!("{:.*}", decimals, result.r_squared),
            Self::Observations => result.n_observations.to_string(),
            Self::Custom(statistic) => statistic(result),
        }
    }
}

/// What a summary row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Coefficient,
    StdError,
    Info,
}

/// One table row: a label and one cell per model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub kind: RowKind,
    /// Regressor or statistic name; empty for standard-error rows.
    pub label: String,
    pub cells: Vec<String>,
}

/// A rendered-ready comparison of several fitted models.
///
/// # Example
///
/// ```
/// use ivreg::prelude::*;
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(6, 1, |i, _| i as f64);
/// let y = Col::from_fn(6, |i| [1.0, 2.9, 5.2, 7.1, 8.8, 11.0][i]);
/// let fit = OlsRegressor::builder().build().fit(&x, &y).unwrap();
///
/// let table = SummaryTable::builder()
///     .model(fit.result())
///     .with_default_info()
///     .build()
///     .unwrap();
///
/// assert_eq!(table.model_names, vec!["y I"]);
/// println!("{table}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub title: Option<String>,
    pub model_names: Vec<String>,
    pub rows: Vec<SummaryRow>,
    pub legend: Vec<String>,
}

impl SummaryTable {
    pub fn builder<'a>() -> SummaryTableBuilder<'a> {
        SummaryTableBuilder::new()
    }

    /// Coefficient row of a regressor.
    pub fn coefficient_row(&self, regressor: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.kind == RowKind::Coefficient && r.label == regressor)
    }

    /// Standard-error row that follows a regressor's coefficient row.
    pub fn std_error_row(&self, regressor: &str) -> Option<&SummaryRow> {
        let at = self
            .rows
            .iter()
            .position(|r| r.kind == RowKind::Coefficient && r.label == regressor)?;
        self.rows.get(at + 1).filter(|r| r.kind == RowKind::StdError)
    }

    /// Info row by label.
    pub fn info_row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.kind == RowKind::Info && r.label == label)
    }

    /// Regressor labels in display order.
    pub fn regressors(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.kind == RowKind::Coefficient)
            .map(|r| r.label.as_str())
            .collect()
    }

    /// Plain-text rendering: title, table, legend.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_HORIZONTAL_ONLY);

        let header = std::iter::once(Cell::new(""))
            .chain(self.model_names.iter().map(Cell::new))
            .collect::<Vec<_>>();
        table.set_header(header);

        for row in &self.rows {
            let cells = std::iter::once(row.label.as_str())
                .chain(row.cells.iter().map(String::as_str))
                .collect::<Vec<_>>();
            table.add_row(cells);
        }

        table.column_iter_mut().enumerate().for_each(|(j, c)| {
            c.set_cell_alignment(if j == 0 {
                CellAlignment::Left
            } else {
                CellAlignment::Right
            });
        });

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(&table.to_string());
        for line in &self.legend {
            out.push('\n');
            out.push_str(line);
        }
        out
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builder for [`SummaryTable`].
pub struct SummaryTableBuilder<'a> {
    results: Vec<&'a RegressionResult>,
    model_names: Option<Vec<String>>,
    decimals: usize,
    stars: bool,
    title: Option<String>,
    regressor_order: Vec<String>,
    drop_omitted: bool,
    info: Vec<(String, InfoStatistic)>,
}

impl Default for SummaryTableBuilder<'_> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            model_names: None,
            decimals: 4,
            stars: true,
            title: None,
            regressor_order: Vec::new(),
            drop_omitted: false,
            info: Vec::new(),
        }
    }
}

impl<'a> SummaryTableBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fitted model as the next column.
    pub fn model(mut self, result: &'a RegressionResult) -> Self {
        self.results.push(result);
        self
    }

    /// Add several fitted models in order.
    pub fn models(mut self, results: impl IntoIterator<Item = &'a RegressionResult>) -> Self {
        self.results.extend(results);
        self
    }

    /// Column headers; must match the number of models.
    pub fn model_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.model_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Decimal places for coefficients and standard errors (default 4).
    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Append significance stars to coefficients (default on).
    pub fn stars(mut self, stars: bool) -> Self {
        self.stars = stars;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Regressors to list first, in this order.
    pub fn regressor_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.regressor_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Omit regressors not named in [`regressor_order`](Self::regressor_order).
    pub fn drop_omitted(mut self, drop: bool) -> Self {
        self.drop_omitted = drop;
        self
    }

    /// Add an info row computed from each model.
    pub fn info(
        mut self,
        label: impl Into<String>,
        statistic: impl Fn(&RegressionResult) -> String + 'static,
    ) -> Self {
        self.info
            .push((label.into(), InfoStatistic::Custom(Box::new(statistic))));
        self
    }

    /// Add `R-squared` and `No. observations` rows.
    ///
    /// R² uses the table's [`decimals`](Self::decimals), whenever that is set.
    pub fn with_default_info(mut self) -> Self {
        self.info
            .push(("R-squared".to_string(), InfoStatistic::RSquared));
        self.info
            .push(("No. observations".to_string(), InfoStatistic::Observations));
        self
    }

    pub fn build(self) -> Result<SummaryTable, SummaryError> {
        if self.results.is_empty() {
            return Err(SummaryError::NoModels);
        }

        let model_names = match self.model_names {
            Some(names) if names.len() != self.results.len() => {
                return Err(SummaryError::CountMismatch {
                    names: names.len(),
                    models: self.results.len(),
                });
            }
            Some(names) => names,
            None => self
                .results
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{} {}", r.response_name, roman(i + 1)))
                .collect(),
        };

        let mut rows = Vec::new();
        for name in ordered_regressors(&self.results, &self.regressor_order, self.drop_omitted) {
            let (coefs, ses): (Vec<String>, Vec<String>) = self
                .results
                .iter()
                .map(|r| coefficient_cells(r, &name, self.decimals, self.stars))
                .unzip();
            rows.push(SummaryRow {
                kind: RowKind::Coefficient,
                label: name,
                cells: coefs,
            });
            rows.push(SummaryRow {
                kind: RowKind::StdError,
                label: String::new(),
                cells: ses,
            });
        }

        for (label, statistic) in &self.info {
            rows.push(SummaryRow {
                kind: RowKind::Info,
                label: label.clone(),
                cells: self
                    .results
                    .iter()
                    .map(|r| statistic.cell(r, self.decimals))
                    .collect(),
            });
        }

        let mut legend = vec![STD_ERROR_LEGEND.to_string()];
        if self.stars {
            legend.push(STAR_LEGEND.to_string());
        }

        Ok(SummaryTable {
            title: self.title,
            model_names,
            rows,
            legend,
        })
    }
}

/// Coefficient and standard-error cells; blank when the model lacks the regressor.
fn coefficient_cells(
    result: &RegressionResult,
    name: &str,
    decimals: usize,
    stars: bool,
) -> (String, String) {
    let Some(j) = result.index_of(name) else {
        return (String::new(), String::new());
    };
    let Some(coef) = result.get_coefficient(j) else {
        return (String::new(), String::new());
    };

    let d = decimals;
    let marks = match (&result.p_values, stars) {
        (Some(p), true) => significance_stars(p[j]),
        _ => "",
    };
    let se = result
        .std_errors
        .as_ref()
        .map(|se| se[j])
        .filter(|v| v.is_finite())
        .map_or(String::new(), |v| format!("({v:.d$})"));

    (format!("{coef:.d$}{marks}"), se)
}

/// Caller order first (names no model has are skipped), then the rest in
/// first-seen order unless `drop_omitted`.
fn ordered_regressors(
    results: &[&RegressionResult],
    order: &[String],
    drop_omitted: bool,
) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for result in results {
        for name in &result.feature_names {
            if !seen.contains(name) {
                seen.push(name.clone());
            }
        }
    }

    let mut ordered: Vec<String> = Vec::new();
    for name in order {
        if seen.contains(name) && !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    if !drop_omitted {
        for name in seen {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
    }
    ordered
}

fn roman(mut n: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, numeral) in &NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
