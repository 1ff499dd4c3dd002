//! Regression summary tables with significance stars.

mod stars;
mod table;

pub use stars::{significance_stars, STAR_LEGEND, STAR_THRESHOLDS};
pub use table::{
    RowKind, SummaryError, SummaryRow, SummaryTable, SummaryTableBuilder, STD_ERROR_LEGEND,
};
