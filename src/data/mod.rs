//! Tabular data, model specifications and dummy encoding.

mod dataset;
mod design;
mod dummies;
mod loader;

pub use dataset::{Column, DataError, Dataset, CONSTANT_COLUMN};
pub use design::{Design, IvDesign, IvSpec, ModelSpec};
pub use dummies::{CategoryOrder, DummyEncoder, DummyEncoding};
pub use loader::MISSING_TOKENS;

pub(crate) use design::default_names;
