//! clinical-ml - Binary-classification experiments on small clinical tables
//!
//! This crate runs a fixed, reproducible pipeline over a tabular dataset
//! with a binary outcome:
//! - Loading a fixed-schema CSV and describing it
//! - Stratified train/test split and k-fold resampling
//! - A leak-free preprocessing recipe fitted on training rows only
//! - Grid search over elastic-net logistic regression and random forests
//! - Held-out evaluation, permutation importance and partial dependence
//! - Chart descriptions with terminal and SVG renderers
//!
//! # Modules
//!
//! ## Data
//! - [`data`] - Schema, dataset and CSV loader
//! - [`analysis`] - Descriptive statistics and correlations
//!
//! ## Modeling
//! - [`preprocessing`] - Centering, scaling, Yeo-Johnson, one-hot encoding
//! - [`training`] - Splitting, classifiers, metrics and grid search
//! - [`evaluation`] - Test-set predictions and confusion matrices
//! - [`explainability`] - Permutation importance and partial dependence
//!
//! ## Output
//! - [`reporting`] - Chart specifications, renderers, model comparison
//! - [`experiment`] - End-to-end orchestration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod data;
pub mod analysis;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod evaluation;
pub mod explainability;

// Output
pub mod reporting;
pub mod experiment;
pub mod cli;

pub use error::{ClinicalError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ClinicalError, Result};

    // Data
    pub use crate::data::{ColumnKind, ColumnSpec, DataLoader, Dataset, Schema};
    pub use crate::analysis::{describe, DescriptiveReport};

    // Preprocessing
    pub use crate::preprocessing::{FittedRecipe, RecipeConfig};

    // Training
    pub use crate::training::{
        FittedModel, ForestGrid, HyperparameterGrid, LogisticGrid, ModelSpec, ModelTuner, StratifiedSplitter,
    };

    // Evaluation and explainability
    pub use crate::evaluation::{evaluate, Evaluation};
    pub use crate::explainability::{ImportanceScorer, PartialDependence, PermutationImportance};

    // Reporting
    pub use crate::reporting::{ChartRenderer, ChartSpec, ComparisonReport, TextRenderer};

    // Experiment
    pub use crate::experiment::{Background, Experiment, ExperimentConfig, ExperimentReport};
}
