//! End-to-end experiment: describe, split, tune, evaluate, explain, report

use super::config::{Background, ExperimentConfig};
use crate::analysis::{describe, DescriptiveReport};
use crate::data::Dataset;
use crate::error::{ClinicalError, Result};
use crate::evaluation::{evaluate, Evaluation};
use crate::explainability::{ImportanceResult, PDPResult, PartialDependence, PermutationImportance};
use crate::reporting::{
    descriptive_charts, importance_chart, pdp_chart, roc_chart, tuning_chart, ChartSpec, ComparisonReport,
};
use crate::training::{
    CVSplit, FittedModel, HyperparameterGrid, ModelTuner, StratifiedSplitter, TrainTestSplit, TuneResult,
};
use std::time::Instant;
use tracing::info;

/// Everything produced for one model family
#[derive(Debug)]
pub struct ModelReport {
    pub name: String,
    pub tuning: TuneResult,
    pub model: FittedModel,
    pub evaluation: Evaluation,
    pub importance: ImportanceResult,
    pub partial_dependence: Vec<PDPResult>,
}

impl ModelReport {
    pub fn charts(&self) -> Vec<ChartSpec> {
        let mut charts = vec![
            tuning_chart(&self.tuning),
            roc_chart(&self.tuning),
            importance_chart(&self.importance, &self.name),
        ];
        charts.extend(self.partial_dependence.iter().map(|p| pdp_chart(p, &self.name)));
        charts
    }
}

/// All artifacts of a run
#[derive(Debug)]
pub struct ExperimentReport {
    pub config: ExperimentConfig,
    pub descriptive: DescriptiveReport,
    pub split: TrainTestSplit,
    pub logistic: ModelReport,
    pub forest: ModelReport,
    pub comparison: ComparisonReport,
    pub elapsed_secs: f64,
}

impl ExperimentReport {
    /// Every chart in presentation order, ending with the accuracy comparison
    pub fn charts(&self) -> Vec<ChartSpec> {
        let mut charts = descriptive_charts(&self.descriptive, &self.config.schema.outcome);
        charts.extend(self.logistic.charts());
        charts.extend(self.forest.charts());
        charts.push(self.comparison.accuracy_chart());
        charts
    }

    pub fn models(&self) -> [&ModelReport; 2] {
        [&self.logistic, &self.forest]
    }
}

/// Runs the pipeline for one configuration
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every stage on `data`. Configuration and schema problems abort
    /// the run; failures of single tuning trials do not.
    pub fn run(&self, data: &Dataset) -> Result<ExperimentReport> {
        let start = Instant::now();
        let cfg = &self.config;
        cfg.validate()?;
        if data.schema() != &cfg.schema {
            return Err(ClinicalError::SchemaError(
                "dataset schema does not match the configured schema".to_string(),
            ));
        }

        info!(rows = data.n_rows(), predictors = cfg.schema.n_predictors(), seed = cfg.seed, "Starting experiment");
        let descriptive = describe(data);

        let splitter = StratifiedSplitter::new(cfg.train_fraction, cfg.n_folds, cfg.seed);
        let split = splitter.split(data.labels())?;
        let train = data.select(&split.train);
        let test = data.select(&split.test);
        let folds = splitter.folds(train.labels())?;
        info!(train = train.n_rows(), test = test.n_rows(), folds = folds.len(), "Split dataset");

        let logistic = self.run_family("logistic regression", cfg.logistic(), &train, &test, &folds)?;
        let forest = self.run_family("random forest", cfg.forest(), &train, &test, &folds)?;

        let comparison = ComparisonReport::new(test.majority_baseline())
            .with_model(logistic.name.clone(), &logistic.evaluation)
            .with_model(forest.name.clone(), &forest.evaluation);

        let elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            logistic_accuracy = logistic.evaluation.accuracy,
            forest_accuracy = forest.evaluation.accuracy,
            baseline = comparison.majority_baseline,
            elapsed_secs,
            "Experiment finished"
        );

        Ok(ExperimentReport {
            config: cfg.clone(),
            descriptive,
            split,
            logistic,
            forest,
            comparison,
            elapsed_secs,
        })
    }

    fn run_family(
        &self,
        name: &str,
        grid: HyperparameterGrid,
        train: &Dataset,
        test: &Dataset,
        folds: &[CVSplit],
    ) -> Result<ModelReport> {
        let cfg = &self.config;
        let mut tuner = ModelTuner::new(cfg.recipe.clone(), grid).with_seed(cfg.seed);
        if let Some(n) = cfg.n_jobs {
            tuner = tuner.with_n_jobs(n);
        }
        let (tuning, model) = tuner.tune(train, folds)?;
        let evaluation = evaluate(&model, test)?;

        let background = match cfg.background {
            Background::Train => train,
            Background::Test => test,
        };
        let importance = PermutationImportance::new()
            .with_n_repeats(cfg.importance_repeats)
            .with_seed(cfg.seed)
            .with_scorer(cfg.importance_scorer)
            .compute(&model, background)?;

        let features: Vec<String> = if cfg.pdp_features.is_empty() {
            importance
                .top_k(cfg.pdp_top_k)
                .into_iter()
                .map(|(name, _, _)| name)
                .collect()
        } else {
            cfg.pdp_features.clone()
        };
        let pdp = PartialDependence::new()
            .with_grid_points(cfg.pdp_grid_points)
            .with_percentile_range(cfg.pdp_percentiles.0, cfg.pdp_percentiles.1)
            .with_smoothing_window(cfg.pdp_smoothing_window);
        let names: Vec<&str> = features.iter().map(String::as_str).collect();
        let partial_dependence = pdp.compute_batch(&model, background, &names)?;

        info!(
            model = name,
            best = %tuning.best_spec,
            cv_roc_auc = tuning.best_summary().mean_roc_auc,
            test_accuracy = evaluation.accuracy,
            "Finished model family"
        );

        Ok(ModelReport {
            name: name.to_string(),
            tuning,
            model,
            evaluation,
            importance,
            partial_dependence,
        })
    }
}
