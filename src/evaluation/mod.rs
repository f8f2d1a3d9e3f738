//! Held-out evaluation of a fitted model

use crate::data::Dataset;
use crate::error::Result;
use crate::training::{roc_auc, ClassificationMetrics, ConfusionMatrix, FittedModel, ModelSpec};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Predictions and metrics of one model on one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub spec: ModelSpec,
    /// Predicted class per row (probability >= 0.5 is class 1)
    pub predictions: Array1<f64>,
    /// Class-1 probability per row
    pub probabilities: Array1<f64>,
    pub labels: Array1<f64>,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    /// Undefined when the dataset holds a single class
    pub roc_auc: Option<f64>,
    pub metrics: ClassificationMetrics,
}

impl Evaluation {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }
}

/// Score `model` on `data`, which must match the schema the model was fitted on
pub fn evaluate(model: &FittedModel, data: &Dataset) -> Result<Evaluation> {
    let probabilities = model.predict_proba(data)?;
    let predictions = probabilities.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 });
    let labels = data.labels().clone();

    let confusion = ConfusionMatrix::from_predictions(&labels, &predictions);
    let metrics = ClassificationMetrics::compute(&labels, &predictions, &probabilities);
    let auc = roc_auc(&labels, &probabilities).ok();

    info!(
        model = %model.spec(),
        rows = labels.len(),
        accuracy = confusion.accuracy(),
        roc_auc = auc.unwrap_or(f64::NAN),
        "Evaluated model"
    );

    Ok(Evaluation {
        spec: *model.spec(),
        accuracy: confusion.accuracy(),
        predictions,
        probabilities,
        labels,
        confusion,
        roc_auc: auc,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnSpec, Schema};
    use crate::error::ClinicalError;
    use crate::preprocessing::RecipeConfig;
    use ndarray::Array2;

    fn dataset(name: &str) -> Dataset {
        let schema = Schema::new(vec![ColumnSpec::numeric(name)], "y").unwrap();
        let x = Array2::from_shape_fn((20, 1), |(i, _)| if i < 10 { i as f64 } else { 20.0 + i as f64 });
        let y = ndarray::Array1::from_shape_fn(20, |i| if i < 10 { 0.0 } else { 1.0 });
        Dataset::new(schema, x, y).unwrap()
    }

    #[test]
    fn test_evaluate_counts() {
        let data = dataset("marker");
        let spec = ModelSpec::LogisticRegression { penalty: 0.05, mixture: 0.0 };
        let model = FittedModel::fit(spec, &RecipeConfig::default(), &data, 0).unwrap();
        let eval = evaluate(&model, &data).unwrap();

        assert_eq!(eval.confusion.total(), 20);
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.roc_auc, Some(1.0));
        let rows = eval.confusion.as_rows();
        assert_eq!(rows, [[10, 0], [0, 10]]);
        assert!(eval.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_schema_mismatch() {
        let spec = ModelSpec::LogisticRegression { penalty: 0.05, mixture: 0.0 };
        let model = FittedModel::fit(spec, &RecipeConfig::default(), &dataset("marker"), 0).unwrap();
        let other = dataset("other");
        assert!(matches!(evaluate(&model, &other), Err(ClinicalError::SchemaError(_))));
    }
}
