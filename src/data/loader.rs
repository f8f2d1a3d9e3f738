//! CSV loading into a typed [`Dataset`]

use super::dataset::Dataset;
use super::schema::Schema;
use crate::error::{ClinicalError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Rows scanned by polars for dtype inference
const INFER_SCHEMA_ROWS: usize = 1000;

/// Loader for fixed-schema CSV files
pub struct DataLoader {
    schema: Schema,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(Schema::heart_failure())
    }
}

impl DataLoader {
    /// Create a loader for the given schema
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let start = Instant::now();

        if !path.exists() {
            return Err(ClinicalError::DataError(format!(
                "input file not found: {}",
                path.display()
            )));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let dataset = self.from_frame(&df)?;
        info!(
            path = %path.display(),
            rows = dataset.n_rows(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Convert an in-memory frame into a dataset, checking the header against the schema
    pub fn from_frame(&self, df: &DataFrame) -> Result<Dataset> {
        self.check_header(df)?;

        let n_rows = df.height();
        let n_predictors = self.schema.n_predictors();
        let mut features = Array2::<f64>::zeros((n_rows, n_predictors));

        for (j, spec) in self.schema.predictors.iter().enumerate() {
            let values = Self::column_values(df, &spec.name)?;
            for (i, v) in values.into_iter().enumerate() {
                features[[i, j]] = v;
            }
        }

        let labels = Array1::from_vec(Self::column_values(df, &self.schema.outcome)?);
        debug!(rows = n_rows, predictors = n_predictors, "Converted frame to dataset");

        Dataset::new(self.schema.clone(), features, labels)
    }

    fn check_header(&self, df: &DataFrame) -> Result<()> {
        let present: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let present_set: HashSet<&str> = present.iter().map(|s| s.as_str()).collect();
        let expected = self.schema.all_columns();
        let expected_set: HashSet<&str> = expected.iter().map(|s| s.as_str()).collect();

        let missing: Vec<&str> = expected.iter().map(|s| s.as_str()).filter(|c| !present_set.contains(c)).collect();
        if !missing.is_empty() {
            return Err(ClinicalError::SchemaError(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        let extra: Vec<&str> = present.iter().map(|s| s.as_str()).filter(|c| !expected_set.contains(c)).collect();
        if !extra.is_empty() {
            return Err(ClinicalError::SchemaError(format!(
                "unexpected columns: {}",
                extra.join(", ")
            )));
        }
        Ok(())
    }

    fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df
            .column(name)
            .map_err(|_| ClinicalError::SchemaError(format!("missing column '{}'", name)))?;
        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| ClinicalError::DataError(format!("column '{}' is not numeric: {}", name, e)))?;
        let ca = series.f64()?;

        ca.into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| {
                    ClinicalError::ConfigurationError(format!(
                        "missing value in column '{}' at row {}",
                        name, row
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::ColumnSpec;
    use std::io::Write;

    fn small_schema() -> Schema {
        Schema::new(
            vec![ColumnSpec::numeric("age"), ColumnSpec::categorical("smoking")],
            "DEATH_EVENT",
        )
        .unwrap()
    }

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("clinical_ml_loader_{}_{}.csv", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let path = write_temp("ok", "age,smoking,DEATH_EVENT\n75,0,1\n55,1,0\n65,0,0\n");
        let ds = DataLoader::new(small_schema()).load_csv(&path).unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.features()[[0, 0]], 75.0);
        assert_eq!(ds.labels()[0], 1.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_column_order_independent() {
        let path = write_temp("order", "DEATH_EVENT,smoking,age\n1,0,75\n0,1,55\n");
        let ds = DataLoader::new(small_schema()).load_csv(&path).unwrap();
        assert_eq!(ds.features()[[1, 0]], 55.0);
        assert_eq!(ds.features()[[1, 1]], 1.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let path = write_temp("missing", "age,DEATH_EVENT\n75,1\n");
        let result = DataLoader::new(small_schema()).load_csv(&path);
        assert!(matches!(result, Err(ClinicalError::SchemaError(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_empty_cell_is_configuration_error() {
        let path = write_temp("empty", "age,smoking,DEATH_EVENT\n75,,1\n60,1,0\n");
        let result = DataLoader::new(small_schema()).load_csv(&path);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let result = DataLoader::default().load_csv("/nonexistent/heart.csv");
        assert!(matches!(result, Err(ClinicalError::DataError(_))));
    }
}
