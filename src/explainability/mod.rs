//! Model explainability module
//!
//! Global, model-agnostic explanations computed on raw predictors:
//! - Permutation feature importance
//! - Partial dependence curves with moving-average smoothing

mod importance;
mod pdp;

pub use importance::{ImportanceResult, ImportanceScorer, PermutationImportance};
pub use pdp::{moving_average, PDPResult, PartialDependence};
