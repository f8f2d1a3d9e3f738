//! Model specifications, the classifier capability and fitted pipelines

use super::logistic::LogisticRegression;
use super::random_forest::RandomForest;
use crate::data::Dataset;
use crate::error::Result;
use crate::preprocessing::{FittedRecipe, RecipeConfig};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One point of a hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelSpec {
    LogisticRegression {
        penalty: f64,
        mixture: f64,
    },
    RandomForest {
        mtry: usize,
        min_node_size: usize,
        tree_count: usize,
    },
}

impl ModelSpec {
    /// Unfitted classifier for this spec. `seed` drives any randomness.
    pub fn build(&self, seed: u64) -> Box<dyn Classifier> {
        match *self {
            ModelSpec::LogisticRegression { penalty, mixture } => {
                Box::new(LogisticRegression::new(penalty, mixture))
            }
            ModelSpec::RandomForest { mtry, min_node_size, tree_count } => {
                Box::new(RandomForest::new(tree_count, mtry, min_node_size).with_seed(seed))
            }
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            ModelSpec::LogisticRegression { .. } => "logistic_regression",
            ModelSpec::RandomForest { .. } => "random_forest",
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSpec::LogisticRegression { penalty, mixture } => {
                write!(f, "logistic(penalty={:.2e}, mixture={:.2})", penalty, mixture)
            }
            ModelSpec::RandomForest { mtry, min_node_size, tree_count } => write!(
                f,
                "random_forest(mtry={}, min_n={}, trees={})",
                mtry, min_node_size, tree_count
            ),
        }
    }
}

/// Binary classifier over a preprocessed feature matrix
pub trait Classifier: Send + Sync + fmt::Debug {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Probability of class 1 for each row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Class labels with a 0.5 threshold
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.predict_proba(x)?.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn name(&self) -> &'static str;
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LogisticRegression::fit(self, x, y).map(|_| ())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LogisticRegression::predict_proba(self, x)
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RandomForest::fit(self, x, y).map(|_| ())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict_proba(self, x)
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

/// A fitted recipe and classifier that together score raw datasets
#[derive(Debug)]
pub struct FittedModel {
    spec: ModelSpec,
    recipe: FittedRecipe,
    classifier: Box<dyn Classifier>,
}

impl FittedModel {
    /// Fit the recipe on `train`, then the classifier on the transformed rows
    pub fn fit(spec: ModelSpec, recipe: &RecipeConfig, train: &Dataset, seed: u64) -> Result<Self> {
        let fitted_recipe = recipe.fit(train)?;
        let features = fitted_recipe.apply(train)?;
        let mut classifier = spec.build(seed);
        classifier.fit(&features.values, train.labels())?;

        Ok(Self {
            spec,
            recipe: fitted_recipe,
            classifier,
        })
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn recipe(&self) -> &FittedRecipe {
        &self.recipe
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Names of the columns the classifier sees
    pub fn feature_names(&self) -> &[String] {
        self.recipe.output_names()
    }

    /// Class-1 probability for each row of a raw dataset
    pub fn predict_proba(&self, data: &Dataset) -> Result<Array1<f64>> {
        let features = self.recipe.apply(data)?;
        self.classifier.predict_proba(&features.values)
    }

    /// Predicted class for each row of a raw dataset
    pub fn predict(&self, data: &Dataset) -> Result<Array1<f64>> {
        let features = self.recipe.apply(data)?;
        self.classifier.predict(&features.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnSpec, Schema};
    use ndarray::array;

    #[test]
    fn test_spec_serde_tag() {
        let spec = ModelSpec::RandomForest { mtry: 3, min_node_size: 5, tree_count: 100 };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"family\":\"random_forest\""));
        let back: ModelSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_fitted_model_predicts_raw_rows() {
        let schema = Schema::new(vec![ColumnSpec::numeric("marker")], "y").unwrap();
        let train = Dataset::new(
            schema,
            array![[1.0], [2.0], [3.0], [4.0], [10.0], [11.0], [12.0], [13.0]],
            array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();

        let spec = ModelSpec::LogisticRegression { penalty: 0.05, mixture: 0.0 };
        let model = FittedModel::fit(spec, &RecipeConfig::default(), &train, 1).unwrap();
        let pred = model.predict(&train).unwrap();
        assert_eq!(pred, *train.labels());
        assert_eq!(model.feature_names(), &["marker"]);
    }
}
