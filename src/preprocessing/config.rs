//! Preprocessing recipe configuration

use crate::error::{ClinicalError, Result};
use serde::{Deserialize, Serialize};

/// Which recipe steps run, in their fixed order:
/// center/scale, Yeo-Johnson, rare-level collapse, one-hot encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Center numeric predictors on the training mean and divide by the sample std
    pub normalize: bool,

    /// Apply a Yeo-Johnson power transform to numeric predictors
    pub yeo_johnson: bool,

    /// Collapse categorical levels below `rare_threshold` into `other`
    pub collapse_rare: bool,

    /// Minimum training frequency for a categorical level to keep its own column
    pub rare_threshold: f64,

    /// Expand categorical predictors into indicator columns.
    /// When disabled, categorical codes pass through unchanged.
    pub one_hot: bool,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            yeo_johnson: true,
            collapse_rare: true,
            rare_threshold: 0.05,
            one_hot: true,
        }
    }
}

impl RecipeConfig {
    /// Create a configuration with every step enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every step disabled (identity recipe)
    pub fn passthrough() -> Self {
        Self {
            normalize: false,
            yeo_johnson: false,
            collapse_rare: false,
            rare_threshold: 0.0,
            one_hot: false,
        }
    }

    pub fn with_normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn with_yeo_johnson(mut self, enabled: bool) -> Self {
        self.yeo_johnson = enabled;
        self
    }

    pub fn with_one_hot(mut self, enabled: bool) -> Self {
        self.one_hot = enabled;
        self
    }

    /// Enable rare-level collapsing at the given frequency threshold
    pub fn with_rare_threshold(mut self, threshold: f64) -> Self {
        self.collapse_rare = true;
        self.rare_threshold = threshold;
        self
    }

    pub fn without_rare_collapse(mut self) -> Self {
        self.collapse_rare = false;
        self
    }

    /// Check the rare-level threshold lies in [0, 1) when collapsing is enabled
    pub fn validate(&self) -> Result<()> {
        if self.collapse_rare && !(0.0..1.0).contains(&self.rare_threshold) {
            return Err(ClinicalError::ConfigurationError(format!(
                "rare_threshold must be in [0, 1), got {}",
                self.rare_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecipeConfig::default();
        assert!(config.normalize && config.yeo_johnson && config.one_hot);
        assert_eq!(config.rare_threshold, 0.05);
    }

    #[test]
    fn test_builder_pattern() {
        let config = RecipeConfig::passthrough()
            .with_normalize(true)
            .with_rare_threshold(0.1);
        assert!(config.normalize);
        assert!(!config.yeo_johnson);
        assert!(config.collapse_rare);
        assert_eq!(config.rare_threshold, 0.1);
    }

    #[test]
    fn test_validate_threshold() {
        assert!(RecipeConfig::default().validate().is_ok());
        assert!(RecipeConfig::default().with_rare_threshold(1.5).validate().is_err());
        assert!(RecipeConfig::default().with_rare_threshold(-0.1).validate().is_err());
        // Ignored when collapsing is off
        let off = RecipeConfig { rare_threshold: 1.5, ..RecipeConfig::passthrough() };
        assert!(off.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: RecipeConfig = serde_json::from_str(r#"{"yeo_johnson": false}"#).unwrap();
        assert!(!config.yeo_johnson);
        assert!(config.normalize);
    }
}
