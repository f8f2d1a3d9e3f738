//! Fit-once, apply-many preprocessing recipe

use super::config::RecipeConfig;
use super::encoder::OneHotEncoder;
use super::scaler::ScalerParams;
use super::transforms::YeoJohnson;
use crate::data::{ColumnKind, ColumnSpec, Dataset};
use crate::error::{ClinicalError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model-ready numeric matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }
}

/// Fitted parameters for one input predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnStep {
    Numeric {
        scaler: Option<ScalerParams>,
        yeo_johnson: Option<YeoJohnson>,
    },
    Categorical {
        encoder: Option<OneHotEncoder>,
    },
}

impl ColumnStep {
    fn width(&self) -> usize {
        match self {
            ColumnStep::Numeric { .. } => 1,
            ColumnStep::Categorical { encoder: Some(enc) } => enc.width(),
            ColumnStep::Categorical { encoder: None } => 1,
        }
    }
}

/// Recipe parameters learned from one dataset.
///
/// Applying it never changes it: the same input always produces the same
/// output, and the output columns are fixed when the recipe is fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRecipe {
    config: RecipeConfig,
    inputs: Vec<ColumnSpec>,
    steps: Vec<ColumnStep>,
    output_names: Vec<String>,
}

impl RecipeConfig {
    /// Learn every step's parameters from `data`
    pub fn fit(&self, data: &Dataset) -> Result<FittedRecipe> {
        if data.is_empty() {
            return Err(ClinicalError::DataError(
                "cannot fit a recipe on an empty dataset".to_string(),
            ));
        }
        self.validate()?;

        let schema = data.schema();
        let x = data.features();
        let mut steps = Vec::with_capacity(schema.n_predictors());
        let mut output_names = Vec::new();

        for (j, spec) in schema.predictors.iter().enumerate() {
            let column = x.column(j);
            let step = match spec.kind {
                ColumnKind::Numeric => {
                    let scaler = self.normalize.then(|| ScalerParams::fit(column));
                    let yeo_johnson = if self.yeo_johnson {
                        let scaled: Vec<f64> = column
                            .iter()
                            .map(|&v| scaler.map_or(v, |s| s.apply(v)))
                            .collect();
                        Some(YeoJohnson::fit(&scaled))
                    } else {
                        None
                    };
                    output_names.push(spec.name.clone());
                    ColumnStep::Numeric { scaler, yeo_johnson }
                }
                ColumnKind::Categorical => {
                    if self.one_hot {
                        let threshold = self.collapse_rare.then_some(self.rare_threshold);
                        let enc = OneHotEncoder::fit(&spec.name, column, threshold);
                        output_names.extend(enc.output_names());
                        ColumnStep::Categorical { encoder: Some(enc) }
                    } else {
                        output_names.push(spec.name.clone());
                        ColumnStep::Categorical { encoder: None }
                    }
                }
            };
            steps.push(step);
        }

        debug!(
            rows = data.n_rows(),
            inputs = schema.n_predictors(),
            outputs = output_names.len(),
            "Fitted preprocessing recipe"
        );

        Ok(FittedRecipe {
            config: self.clone(),
            inputs: schema.predictors.clone(),
            steps,
            output_names,
        })
    }
}

impl FittedRecipe {
    pub fn config(&self) -> &RecipeConfig {
        &self.config
    }

    pub fn steps(&self) -> &[ColumnStep] {
        &self.steps
    }

    /// Predictor columns the recipe expects, in order
    pub fn inputs(&self) -> &[ColumnSpec] {
        &self.inputs
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn n_outputs(&self) -> usize {
        self.output_names.len()
    }

    /// Transform a dataset with the fitted parameters
    pub fn apply(&self, data: &Dataset) -> Result<FeatureMatrix> {
        self.check_inputs(data)?;

        let x = data.features();
        let mut values = Array2::<f64>::zeros((data.n_rows(), self.n_outputs()));
        let mut offset = 0;

        for (j, step) in self.steps.iter().enumerate() {
            let width = step.width();
            match step {
                ColumnStep::Numeric { scaler, yeo_johnson } => {
                    for (i, &v) in x.column(j).iter().enumerate() {
                        let mut z = scaler.map_or(v, |s| s.apply(v));
                        if let Some(yj) = yeo_johnson {
                            z = yj.apply(z);
                        }
                        values[[i, offset]] = z;
                    }
                }
                ColumnStep::Categorical { encoder: Some(enc) } => {
                    for (i, &v) in x.column(j).iter().enumerate() {
                        values[[i, offset + enc.slot(v)]] = 1.0;
                    }
                }
                ColumnStep::Categorical { encoder: None } => {
                    values.column_mut(offset).assign(&x.column(j));
                }
            }
            offset += width;
        }

        Ok(FeatureMatrix {
            names: self.output_names.clone(),
            values,
        })
    }

    fn check_inputs(&self, data: &Dataset) -> Result<()> {
        let predictors = &data.schema().predictors;
        if predictors.len() != self.inputs.len() {
            return Err(ClinicalError::SchemaError(format!(
                "recipe expects {} predictors, dataset has {}",
                self.inputs.len(),
                predictors.len()
            )));
        }
        for (expected, actual) in self.inputs.iter().zip(predictors) {
            if expected != actual {
                return Err(ClinicalError::SchemaError(format!(
                    "recipe expects column '{}' ({:?}), found '{}' ({:?})",
                    expected.name, expected.kind, actual.name, actual.kind
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Schema;
    use ndarray::array;

    fn dataset() -> Dataset {
        let schema = Schema::new(
            vec![ColumnSpec::numeric("age"), ColumnSpec::categorical("smoking")],
            "y",
        )
        .unwrap();
        Dataset::new(
            schema,
            array![[40.0, 0.0], [50.0, 1.0], [60.0, 0.0], [90.0, 1.0]],
            array![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_output_schema() {
        let recipe = RecipeConfig::default().fit(&dataset()).unwrap();
        assert_eq!(
            recipe.output_names(),
            &["age", "smoking_0", "smoking_1", "smoking_other"]
        );
        let out = recipe.apply(&dataset()).unwrap();
        assert_eq!(out.values.dim(), (4, 4));
        assert_eq!(&out.values.row(1).to_vec()[1..], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_apply_is_repeatable() {
        let data = dataset();
        let recipe = RecipeConfig::default().fit(&data).unwrap();
        let before = serde_json::to_string(&recipe).unwrap();
        let a = recipe.apply(&data).unwrap();
        let b = recipe.apply(&data).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&recipe).unwrap(), before);
    }

    #[test]
    fn test_normalize_only() {
        let recipe = RecipeConfig::passthrough()
            .with_normalize(true)
            .fit(&dataset())
            .unwrap();
        let out = recipe.apply(&dataset()).unwrap();
        let age = out.values.column(0);
        assert!(age.sum().abs() < 1e-9);
        assert_eq!(out.values.column(1).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_schema_mismatch() {
        let recipe = RecipeConfig::default().fit(&dataset()).unwrap();
        let other_schema = Schema::new(
            vec![ColumnSpec::numeric("age"), ColumnSpec::numeric("smoking")],
            "y",
        )
        .unwrap();
        let other = Dataset::new(other_schema, array![[1.0, 0.0]], array![0.0]).unwrap();
        assert!(matches!(recipe.apply(&other), Err(ClinicalError::SchemaError(_))));
    }

    #[test]
    fn test_serde_roundtrip() {
        let recipe = RecipeConfig::default().fit(&dataset()).unwrap();
        let json = serde_json::to_string(&recipe).unwrap();
        let restored: FittedRecipe = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.output_names(), recipe.output_names());
        let a = restored.apply(&dataset()).unwrap();
        let b = recipe.apply(&dataset()).unwrap();
        for (x, y) in a.values.iter().zip(b.values.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
