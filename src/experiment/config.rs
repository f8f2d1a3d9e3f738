//! Experiment configuration

use crate::data::Schema;
use crate::error::{ClinicalError, Result};
use crate::explainability::ImportanceScorer;
use crate::preprocessing::RecipeConfig;
use crate::training::{ForestGrid, HyperparameterGrid, LogisticGrid};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rows the explainer perturbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    #[default]
    Train,
    Test,
}

/// Everything a run needs besides the data. Every field has a default, so a
/// JSON file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub schema: Schema,
    pub recipe: RecipeConfig,
    pub logistic_grid: LogisticGrid,
    pub forest_grid: ForestGrid,

    /// Share of rows assigned to Train (0, 1)
    pub train_fraction: f64,
    /// Number of stratified folds over Train
    pub n_folds: usize,
    pub seed: u64,
    /// Size of a dedicated thread pool; `None` uses the global rayon pool
    pub n_jobs: Option<usize>,

    pub importance_repeats: usize,
    pub importance_scorer: ImportanceScorer,

    pub pdp_grid_points: usize,
    /// Lower and upper percentile of the numeric PDP grid
    pub pdp_percentiles: (f64, f64),
    pub pdp_smoothing_window: usize,
    /// Features to draw partial dependence for. When empty, the
    /// `pdp_top_k` most important features of each model are used.
    pub pdp_features: Vec<String>,
    pub pdp_top_k: usize,
    pub background: Background,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            schema: Schema::heart_failure(),
            recipe: RecipeConfig::default(),
            logistic_grid: LogisticGrid::default(),
            forest_grid: ForestGrid::default(),
            train_fraction: 0.75,
            n_folds: 5,
            seed: 42,
            n_jobs: None,
            importance_repeats: 5,
            importance_scorer: ImportanceScorer::RocAuc,
            pdp_grid_points: 20,
            pdp_percentiles: (5.0, 95.0),
            pdp_smoothing_window: 5,
            pdp_features: Vec::new(),
            pdp_top_k: 3,
            background: Background::Train,
        }
    }
}

impl ExperimentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_recipe(mut self, recipe: RecipeConfig) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn with_logistic_grid(mut self, grid: LogisticGrid) -> Self {
        self.logistic_grid = grid;
        self
    }

    pub fn with_forest_grid(mut self, grid: ForestGrid) -> Self {
        self.forest_grid = grid;
        self
    }

    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    pub fn with_importance_repeats(mut self, repeats: usize) -> Self {
        self.importance_repeats = repeats;
        self
    }

    pub fn with_importance_scorer(mut self, scorer: ImportanceScorer) -> Self {
        self.importance_scorer = scorer;
        self
    }

    pub fn with_pdp_grid_points(mut self, n: usize) -> Self {
        self.pdp_grid_points = n;
        self
    }

    pub fn with_pdp_features(mut self, features: Vec<String>) -> Self {
        self.pdp_features = features;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn logistic(&self) -> HyperparameterGrid {
        HyperparameterGrid::LogisticRegression(self.logistic_grid.clone())
    }

    pub fn forest(&self) -> HyperparameterGrid {
        HyperparameterGrid::RandomForest(self.forest_grid.clone())
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ClinicalError::ConfigurationError(format!(
                "train_fraction must lie in (0, 1), got {}",
                self.train_fraction
            )));
        }
        if self.n_folds < 2 {
            return Err(ClinicalError::ConfigurationError(format!(
                "n_folds must be at least 2, got {}",
                self.n_folds
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(ClinicalError::ConfigurationError("n_jobs must be positive".to_string()));
        }
        if self.importance_repeats == 0 {
            return Err(ClinicalError::ConfigurationError(
                "importance_repeats must be positive".to_string(),
            ));
        }
        if self.pdp_grid_points < 2 {
            return Err(ClinicalError::ConfigurationError(
                "pdp_grid_points must be at least 2".to_string(),
            ));
        }
        self.recipe.validate()?;
        self.logistic().validate()?;
        self.forest().validate()?;
        for feature in &self.pdp_features {
            self.schema.index_of(feature)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"seed": 7, "n_folds": 3, "background": "test"}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_folds, 3);
        assert_eq!(config.background, Background::Test);
        assert_eq!(config.train_fraction, 0.75);
        assert_eq!(config.schema, Schema::heart_failure());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            ExperimentConfig::new().with_train_fraction(1.0),
            ExperimentConfig::new().with_n_folds(1),
            ExperimentConfig::new().with_n_jobs(0),
            ExperimentConfig::new().with_pdp_grid_points(1),
            ExperimentConfig::new().with_recipe(RecipeConfig::default().with_rare_threshold(1.5)),
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(ClinicalError::ConfigurationError(_))));
        }
        let from_json: ExperimentConfig = serde_json::from_str(r#"{"recipe": {"rare_threshold": 1.5}}"#).unwrap();
        assert!(matches!(from_json.validate(), Err(ClinicalError::ConfigurationError(_))));

        let unknown = ExperimentConfig::new().with_pdp_features(vec!["bmi".to_string()]);
        assert!(matches!(unknown.validate(), Err(ClinicalError::UnknownFeature(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("clinical_ml_config_{}.json", std::process::id()));
        let config = ExperimentConfig::new().with_seed(11).with_n_jobs(2);
        config.save(&path).unwrap();
        let loaded = ExperimentConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.seed, 11);
        assert_eq!(loaded.n_jobs, Some(2));
        assert_eq!(loaded.forest_grid, config.forest_grid);
        assert_eq!(loaded.logistic_grid.penalties.len(), config.logistic_grid.penalties.len());
    }
}
