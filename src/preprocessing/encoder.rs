//! Rare-level collapsing and one-hot encoding of integer-coded categoricals

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Retained level vocabulary for one categorical predictor.
///
/// Output columns are `<name>_<level>` for each retained level in ascending
/// order, followed by `<name>_other`, which receives collapsed and unseen
/// levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    name: String,
    levels: Vec<i64>,
}

impl OneHotEncoder {
    /// Learn the vocabulary. With `rare_threshold` set, levels whose share of
    /// the rows is below it are left out of the vocabulary.
    pub fn fit(name: &str, values: ArrayView1<'_, f64>, rare_threshold: Option<f64>) -> Self {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &v in values.iter() {
            *counts.entry(level_of(v)).or_insert(0) += 1;
        }

        let n = values.len().max(1) as f64;
        let levels = counts
            .into_iter()
            .filter(|(_, count)| match rare_threshold {
                Some(threshold) => *count as f64 / n >= threshold,
                None => true,
            })
            .map(|(level, _)| level)
            .collect();

        Self {
            name: name.to_string(),
            levels,
        }
    }

    pub fn levels(&self) -> &[i64] {
        &self.levels
    }

    /// Number of indicator columns, including `other`
    pub fn width(&self) -> usize {
        self.levels.len() + 1
    }

    pub fn output_names(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| format!("{}_{}", self.name, level))
            .chain(std::iter::once(format!("{}_other", self.name)))
            .collect()
    }

    /// Position of the indicator set to 1 for a value
    pub fn slot(&self, value: f64) -> usize {
        self.levels
            .binary_search(&level_of(value))
            .unwrap_or(self.levels.len())
    }

    /// Write the indicators for `value` into `out`, which must be `width()` long
    pub fn encode_into(&self, value: f64, out: &mut [f64]) {
        out.iter_mut().for_each(|o| *o = 0.0);
        out[self.slot(value)] = 1.0;
    }
}

#[inline]
fn level_of(value: f64) -> i64 {
    value.round() as i64
}
