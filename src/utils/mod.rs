//! Shared numerical helpers.

mod matrix;

pub use matrix::{
    column, detect_constant_columns, hstack, independent_columns, invert,
    invert_upper_triangular, ones_column_index, prepend_ones, select_columns,
};
