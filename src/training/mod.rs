//! Model training module
//!
//! Provides the two classifier families and the tuning workflow around them:
//! - Stratified train/test splitting and k-fold resampling
//! - Elastic-net logistic regression (IRLS with coordinate descent)
//! - Gini decision trees and random forests
//! - Grid search scored by cross-validated ROC AUC, with a final refit

pub mod decision_tree;
pub mod grid;
pub mod logistic;
pub mod metrics;
pub mod model;
pub mod random_forest;
pub mod splitter;
pub mod tuner;

pub use decision_tree::{DecisionTree, TreeNode};
pub use grid::{ForestGrid, HyperparameterGrid, LogisticGrid};
pub use logistic::LogisticRegression;
pub use metrics::{accuracy, roc_auc, roc_curve, ClassificationMetrics, ConfusionMatrix, RocPoint};
pub use model::{Classifier, FittedModel, ModelSpec};
pub use random_forest::RandomForest;
pub use splitter::{CVSplit, StratifiedSplitter, TrainTestSplit};
pub use tuner::{CandidateSummary, ModelTuner, TrialResult, TuneResult};
