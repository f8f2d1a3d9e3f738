//! Exploratory statistics computed before modeling. Informational only: no
//! later stage reads these values.

mod descriptive;

pub use descriptive::{
    correlation_matrix, describe, quantile, BoxSummary, CategoryDistribution, ColumnSummary,
    DescriptiveReport,
};
