//! Turning pipeline artifacts into charts and summaries

use super::charts::{Bar, BoxStats, ChartSpec, Series, StackSegment};
use crate::analysis::DescriptiveReport;
use crate::evaluation::Evaluation;
use crate::explainability::{ImportanceResult, PDPResult};
use crate::training::{ConfusionMatrix, ModelSpec, TuneResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Pearson correlations of every predictor and the outcome
pub fn correlation_heatmap(report: &DescriptiveReport) -> ChartSpec {
    ChartSpec::Heatmap {
        title: "Correlation matrix".to_string(),
        labels: report.correlation_labels.clone(),
        values: report
            .correlation
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect(),
    }
}

/// Row count per outcome class
pub fn outcome_distribution(report: &DescriptiveReport, outcome: &str) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Distribution of {}", outcome),
        y_label: "rows".to_string(),
        bars: report
            .class_counts
            .iter()
            .map(|(class, count)| Bar::new(format!("{} = {}", outcome, class), *count as f64))
            .collect(),
    }
}

/// One stacked bar chart per categorical predictor: levels on the axis,
/// outcome classes stacked
pub fn category_bars(report: &DescriptiveReport) -> Vec<ChartSpec> {
    report
        .category_distributions
        .iter()
        .map(|dist| {
            let categories = dist.counts.keys().map(|level| level.to_string()).collect();
            let negative = dist.counts.values().map(|(n0, _)| *n0 as f64).collect();
            let positive = dist.counts.values().map(|(_, n1)| *n1 as f64).collect();
            ChartSpec::StackedBar {
                title: format!("{} by outcome", dist.feature),
                categories,
                segments: vec![
                    StackSegment { name: "outcome 0".to_string(), values: negative },
                    StackSegment { name: "outcome 1".to_string(), values: positive },
                ],
            }
        })
        .collect()
}

/// One boxplot per numeric predictor with a box per outcome class
pub fn class_boxplots(report: &DescriptiveReport) -> Vec<ChartSpec> {
    let mut charts: Vec<ChartSpec> = Vec::new();
    let mut current: Option<(String, Vec<BoxStats>)> = None;

    for summary in &report.boxplots {
        let stats = BoxStats {
            label: format!("outcome {}", summary.class),
            min: summary.min,
            q1: summary.q1,
            median: summary.median,
            q3: summary.q3,
            max: summary.max,
        };
        match current.as_mut() {
            Some((feature, boxes)) if *feature == summary.feature => boxes.push(stats),
            _ => {
                if let Some((feature, boxes)) = current.take() {
                    charts.push(boxplot(feature, boxes));
                }
                current = Some((summary.feature.clone(), vec![stats]));
            }
        }
    }
    if let Some((feature, boxes)) = current {
        charts.push(boxplot(feature, boxes));
    }
    charts
}

fn boxplot(feature: String, boxes: Vec<BoxStats>) -> ChartSpec {
    ChartSpec::BoxPlot {
        title: format!("{} by outcome", feature),
        y_label: feature,
        boxes,
    }
}

/// All exploratory charts in presentation order
pub fn descriptive_charts(report: &DescriptiveReport, outcome: &str) -> Vec<ChartSpec> {
    let mut charts = vec![correlation_heatmap(report), outcome_distribution(report, outcome)];
    charts.extend(category_bars(report));
    charts.extend(class_boxplots(report));
    charts
}

/// Per-fold ROC curves of the selected candidate
pub fn roc_chart(tuning: &TuneResult) -> ChartSpec {
    let series = tuning
        .best_roc_curves()
        .into_iter()
        .map(|(fold, curve)| Series {
            name: format!("fold {}", fold + 1),
            points: curve
                .iter()
                .map(|p| (p.false_positive_rate, p.true_positive_rate))
                .collect(),
        })
        .collect();
    ChartSpec::Lines {
        title: format!("ROC curves per fold: {}", tuning.best_spec),
        x_label: "false positive rate".to_string(),
        y_label: "true positive rate".to_string(),
        series,
        diagonal: true,
    }
}

/// Mean CV ROC AUC of every candidate in the grid
pub fn tuning_chart(tuning: &TuneResult) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Cross-validated ROC AUC: {}", tuning.family),
        y_label: "mean ROC AUC".to_string(),
        bars: tuning
            .summaries
            .iter()
            .filter(|s| s.n_successful > 0)
            .map(|s| Bar::new(s.spec.to_string(), s.mean_roc_auc).with_error(s.std_roc_auc))
            .collect(),
    }
}

/// Importance bars, most important first
pub fn importance_chart(importance: &ImportanceResult, model: &str) -> ChartSpec {
    ChartSpec::Bar {
        title: format!("Permutation importance: {}", model),
        y_label: "score drop".to_string(),
        bars: importance
            .ranking()
            .into_iter()
            .map(|(name, mean, std)| Bar::new(name, mean).with_error(std))
            .collect(),
    }
}

/// Raw and smoothed partial dependence of one feature
pub fn pdp_chart(pdp: &PDPResult, model: &str) -> ChartSpec {
    let smoothed = pdp
        .grid_values
        .iter()
        .copied()
        .zip(pdp.smoothed.iter().copied())
        .collect();
    ChartSpec::Lines {
        title: format!("Partial dependence of {}: {}", pdp.feature, model),
        x_label: pdp.feature.clone(),
        y_label: "mean probability".to_string(),
        series: vec![
            Series { name: "partial dependence".to_string(), points: pdp.points() },
            Series { name: "smoothed".to_string(), points: smoothed },
        ],
        diagonal: false,
    }
}

/// Test-set result of one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub name: String,
    pub spec: ModelSpec,
    pub accuracy: f64,
    pub roc_auc: Option<f64>,
    pub confusion: ConfusionMatrix,
}

/// Side-by-side test results of the tuned models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub models: Vec<ModelComparison>,
    /// Accuracy of always predicting the majority class of the test set
    pub majority_baseline: f64,
}

impl ComparisonReport {
    pub fn new(majority_baseline: f64) -> Self {
        Self {
            models: Vec::new(),
            majority_baseline,
        }
    }

    pub fn with_model(mut self, name: impl Into<String>, evaluation: &Evaluation) -> Self {
        self.models.push(ModelComparison {
            name: name.into(),
            spec: evaluation.spec,
            accuracy: evaluation.accuracy,
            roc_auc: evaluation.roc_auc,
            confusion: evaluation.confusion,
        });
        self
    }

    /// Highest test accuracy; the first listed model wins ties
    pub fn best(&self) -> Option<&ModelComparison> {
        self.models
            .iter()
            .fold(None, |best: Option<&ModelComparison>, m| match best {
                Some(b) if b.accuracy >= m.accuracy => Some(b),
                _ => Some(m),
            })
    }

    pub fn accuracy_chart(&self) -> ChartSpec {
        let mut bars: Vec<Bar> = self
            .models
            .iter()
            .map(|m| Bar::new(m.name.clone(), m.accuracy))
            .collect();
        bars.push(Bar::new("majority baseline", self.majority_baseline));
        ChartSpec::Bar {
            title: "Test accuracy".to_string(),
            y_label: "accuracy".to_string(),
            bars,
        }
    }

    /// Plain-text summary with one confusion matrix per model
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Majority baseline: {:.1}%", self.majority_baseline * 100.0);
        for m in &self.models {
            let rows = m.confusion.as_rows();
            let auc = m
                .roc_auc
                .map(|a| format!("{:.3}", a))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(out);
            let _ = writeln!(out, "{} ({})", m.name, m.spec);
            let _ = writeln!(out, "  accuracy {:.1}%  ROC AUC {}", m.accuracy * 100.0, auc);
            let _ = writeln!(out, "                predicted 0  predicted 1");
            let _ = writeln!(out, "  actual 0      {:>11}  {:>11}", rows[0][0], rows[0][1]);
            let _ = writeln!(out, "  actual 1      {:>11}  {:>11}", rows[1][0], rows[1][1]);
        }
        if let Some(best) = self.best() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Best test accuracy: {}", best.name);
        }
        out
    }
}
