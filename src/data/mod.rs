//! Dataset loading and the typed tabular representation
//!
//! - [`Schema`] describes predictor columns and the binary outcome
//! - [`Dataset`] is the immutable rows × predictors matrix plus labels
//! - [`DataLoader`] reads a fixed-schema CSV through polars

mod dataset;
mod loader;
mod schema;

pub use dataset::Dataset;
pub use loader::DataLoader;
pub use schema::{ColumnKind, ColumnSpec, Schema};
