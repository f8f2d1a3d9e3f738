//! Column schema for the tabular input

use crate::error::{ClinicalError, Result};
use serde::{Deserialize, Serialize};

/// Kind of a predictor column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Continuous measurement
    Numeric,
    /// Integer-coded categorical level (binary indicators in the default schema)
    Categorical,
}

/// A single predictor column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Numeric }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Categorical }
    }
}

/// Ordered predictor columns plus the binary outcome column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub predictors: Vec<ColumnSpec>,
    pub outcome: String,
    /// Restrict categorical predictors to {0, 1} at load time
    #[serde(default = "default_binary_categoricals")]
    pub binary_categoricals: bool,
}

fn default_binary_categoricals() -> bool {
    true
}

impl Default for Schema {
    fn default() -> Self {
        Self::heart_failure()
    }
}

impl Schema {
    /// Create a schema from predictor columns and an outcome name
    pub fn new(predictors: Vec<ColumnSpec>, outcome: impl Into<String>) -> Result<Self> {
        let schema = Self {
            predictors,
            outcome: outcome.into(),
            binary_categoricals: true,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// The 13-column heart failure clinical records layout
    pub fn heart_failure() -> Self {
        Self {
            predictors: vec![
                ColumnSpec::numeric("age"),
                ColumnSpec::categorical("anaemia"),
                ColumnSpec::numeric("creatinine_phosphokinase"),
                ColumnSpec::categorical("diabetes"),
                ColumnSpec::numeric("ejection_fraction"),
                ColumnSpec::categorical("high_blood_pressure"),
                ColumnSpec::numeric("platelets"),
                ColumnSpec::numeric("serum_creatinine"),
                ColumnSpec::numeric("serum_sodium"),
                ColumnSpec::categorical("sex"),
                ColumnSpec::categorical("smoking"),
                ColumnSpec::numeric("time"),
            ],
            outcome: "DEATH_EVENT".to_string(),
            binary_categoricals: true,
        }
    }

    /// Reject empty schemas and duplicated names
    pub fn validate(&self) -> Result<()> {
        if self.predictors.is_empty() {
            return Err(ClinicalError::SchemaError("schema has no predictors".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for name in self.predictors.iter().map(|c| c.name.as_str()).chain(std::iter::once(self.outcome.as_str())) {
            if !seen.insert(name) {
                return Err(ClinicalError::SchemaError(format!("duplicate column '{}'", name)));
            }
        }
        Ok(())
    }

    pub fn n_predictors(&self) -> usize {
        self.predictors.len()
    }

    pub fn predictor_names(&self) -> Vec<String> {
        self.predictors.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of a predictor in schema order
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.predictors
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ClinicalError::UnknownFeature(name.to_string()))
    }

    pub fn kind_of(&self, name: &str) -> Result<ColumnKind> {
        Ok(self.predictors[self.index_of(name)?].kind)
    }

    pub fn numeric_indices(&self) -> Vec<usize> {
        self.indices_of_kind(ColumnKind::Numeric)
    }

    pub fn categorical_indices(&self) -> Vec<usize> {
        self.indices_of_kind(ColumnKind::Categorical)
    }

    fn indices_of_kind(&self, kind: ColumnKind) -> Vec<usize> {
        self.predictors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// Every column name expected in the input file
    pub fn all_columns(&self) -> Vec<String> {
        let mut cols = self.predictor_names();
        cols.push(self.outcome.clone());
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_failure_layout() {
        let schema = Schema::heart_failure();
        assert_eq!(schema.all_columns().len(), 13);
        assert_eq!(schema.numeric_indices().len(), 7);
        assert_eq!(schema.categorical_indices().len(), 5);
        assert_eq!(schema.outcome, "DEATH_EVENT");
    }

    #[test]
    fn test_index_of_unknown() {
        let schema = Schema::heart_failure();
        assert_eq!(schema.index_of("time").unwrap(), 11);
        assert!(matches!(schema.index_of("bmi"), Err(ClinicalError::UnknownFeature(_))));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = Schema::new(
            vec![ColumnSpec::numeric("x"), ColumnSpec::numeric("x")],
            "y",
        );
        assert!(matches!(result, Err(ClinicalError::SchemaError(_))));
    }
}
