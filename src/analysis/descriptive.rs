//! Summary statistics, correlations and per-class distributions

use crate::data::{ColumnKind, Dataset};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn from_values(name: &str, kind: ColumnKind, values: ArrayView1<'_, f64>) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = sorted.len();
        let mean = if n > 0 { sorted.iter().sum::<f64>() / n as f64 } else { 0.0 };
        let std = if n > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            name: name.to_string(),
            kind,
            count: n,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(0.0),
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(0.0),
        }
    }
}

/// Linear-interpolated quantile of already sorted values
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Five-number summary of a numeric predictor within one outcome class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSummary {
    pub feature: String,
    pub class: i64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Counts of each (level, outcome) cell for one categorical predictor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub feature: String,
    /// level -> (outcome 0 count, outcome 1 count)
    pub counts: BTreeMap<i64, (usize, usize)>,
}

/// Everything the exploratory stage computes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveReport {
    pub summaries: Vec<ColumnSummary>,
    /// Names for the rows/columns of `correlation`: predictors then the outcome
    pub correlation_labels: Vec<String>,
    pub correlation: Array2<f64>,
    pub class_counts: BTreeMap<i64, usize>,
    pub category_distributions: Vec<CategoryDistribution>,
    pub boxplots: Vec<BoxSummary>,
}

/// Pearson correlation of every pair of columns; constant columns correlate 0
/// with everything except themselves.
pub fn correlation_matrix(data: &Array2<f64>) -> Array2<f64> {
    let n_cols = data.ncols();
    let n = data.nrows() as f64;
    let means: Vec<f64> = (0..n_cols).map(|j| data.column(j).sum() / n.max(1.0)).collect();
    let centered: Vec<Vec<f64>> = (0..n_cols)
        .map(|j| data.column(j).iter().map(|v| v - means[j]).collect())
        .collect();
    let norms: Vec<f64> = centered
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let mut corr = Array2::<f64>::eye(n_cols);
    for a in 0..n_cols {
        for b in (a + 1)..n_cols {
            let denom = norms[a] * norms[b];
            let r = if denom > 0.0 {
                let dot: f64 = centered[a].iter().zip(&centered[b]).map(|(x, y)| x * y).sum();
                (dot / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            corr[[a, b]] = r;
            corr[[b, a]] = r;
        }
    }
    corr
}

/// Compute the full exploratory report for a dataset
pub fn describe(dataset: &Dataset) -> DescriptiveReport {
    let schema = dataset.schema();
    let x = dataset.features();
    let y = dataset.labels();

    let mut summaries: Vec<ColumnSummary> = schema
        .predictors
        .iter()
        .enumerate()
        .map(|(j, spec)| ColumnSummary::from_values(&spec.name, spec.kind, x.column(j)))
        .collect();
    summaries.push(ColumnSummary::from_values(&schema.outcome, ColumnKind::Categorical, y.view()));

    let mut with_outcome = Array2::<f64>::zeros((x.nrows(), x.ncols() + 1));
    with_outcome.slice_mut(ndarray::s![.., ..x.ncols()]).assign(x);
    with_outcome.column_mut(x.ncols()).assign(y);
    let correlation = correlation_matrix(&with_outcome);

    let category_distributions = schema
        .categorical_indices()
        .into_iter()
        .map(|j| {
            let mut counts: BTreeMap<i64, (usize, usize)> = BTreeMap::new();
            for (v, label) in x.column(j).iter().zip(y.iter()) {
                let cell = counts.entry(v.round() as i64).or_insert((0, 0));
                if *label > 0.5 {
                    cell.1 += 1;
                } else {
                    cell.0 += 1;
                }
            }
            CategoryDistribution {
                feature: schema.predictors[j].name.clone(),
                counts,
            }
        })
        .collect();

    let mut boxplots = Vec::new();
    for j in schema.numeric_indices() {
        for class in [0i64, 1] {
            let mut values: Vec<f64> = x
                .column(j)
                .iter()
                .zip(y.iter())
                .filter(|(_, label)| label.round() as i64 == class)
                .map(|(v, _)| *v)
                .collect();
            if values.is_empty() {
                continue;
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            boxplots.push(BoxSummary {
                feature: schema.predictors[j].name.clone(),
                class,
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            });
        }
    }

    DescriptiveReport {
        summaries,
        correlation_labels: schema.all_columns(),
        correlation,
        class_counts: dataset.class_counts(),
        category_distributions,
        boxplots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnSpec, Schema};
    use ndarray::array;

    fn dataset() -> Dataset {
        let schema = Schema::new(
            vec![ColumnSpec::numeric("x"), ColumnSpec::categorical("flag")],
            "y",
        )
        .unwrap();
        Dataset::new(
            schema,
            array![[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [4.0, 1.0]],
            array![0.0, 0.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_quantile() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.5), 3.0);
        assert_eq!(quantile(&v, 0.25), 2.0);
        assert_eq!(quantile(&v, 1.0), 5.0);
    }

    #[test]
    fn test_correlation_perfect() {
        let data = array![[1.0, 2.0, 5.0], [2.0, 4.0, 5.0], [3.0, 6.0, 5.0]];
        let corr = correlation_matrix(&data);
        assert!((corr[[0, 1]] - 1.0).abs() < 1e-12);
        assert_eq!(corr[[0, 2]], 0.0);
        assert_eq!(corr[[2, 2]], 1.0);
    }

    #[test]
    fn test_describe() {
        let report = describe(&dataset());
        assert_eq!(report.summaries.len(), 3);
        assert_eq!(report.correlation.dim(), (3, 3));
        assert_eq!(report.class_counts[&1], 2);

        let flag = &report.category_distributions[0];
        assert_eq!(flag.counts[&0], (2, 0));
        assert_eq!(flag.counts[&1], (0, 2));

        assert_eq!(report.boxplots.len(), 2);
        assert_eq!(report.boxplots[1].median, 3.5);
    }
}
