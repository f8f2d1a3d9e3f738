//! Integration test: the preprocessing recipe only learns from training rows

use clinical_ml::data::{ColumnSpec, Dataset, Schema};
use clinical_ml::error::ClinicalError;
use clinical_ml::preprocessing::RecipeConfig;
use clinical_ml::training::{FittedModel, ModelSpec, StratifiedSplitter};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn schema() -> Schema {
    Schema::new(
        vec![
            ColumnSpec::numeric("age"),
            ColumnSpec::numeric("creatinine"),
            ColumnSpec::categorical("smoking"),
        ],
        "outcome",
    )
    .unwrap()
}

fn dataset(seed: u64, n: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, 3), |(_, j)| match j {
        0 => rng.gen_range(40.0..95.0),
        1 => rng.gen_range(0.5..9.0f64).powi(2),
        _ => f64::from(rng.gen_bool(0.3) as u8),
    });
    let y = Array1::from_shape_fn(n, |i| if i % 3 == 0 { 1.0 } else { 0.0 });
    Dataset::new(schema(), x, y).unwrap()
}

/// Same rows as `data` except that every Test row gets extreme predictor values
fn with_corrupted_rows(data: &Dataset, rows: &[usize]) -> Dataset {
    let mut x = data.features().clone();
    for &i in rows {
        x[[i, 0]] = 1.0e6;
        x[[i, 1]] = -3.0e5;
    }
    Dataset::new(data.schema().clone(), x, data.labels().clone()).unwrap()
}

#[test]
fn test_recipe_ignores_test_rows() {
    let full = dataset(1, 200);
    let splitter = StratifiedSplitter::new(0.75, 5, 42);
    let split = splitter.split(full.labels()).unwrap();
    let corrupted = with_corrupted_rows(&full, &split.test);

    // Splitting only looks at labels, so both datasets split identically
    assert_eq!(splitter.split(corrupted.labels()).unwrap(), split);

    let config = RecipeConfig::default();
    let a = config.fit(&full.select(&split.train)).unwrap();
    let b = config.fit(&corrupted.select(&split.train)).unwrap();
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn test_apply_is_pure_and_matches_model_inputs() {
    let full = dataset(2, 160);
    let split = StratifiedSplitter::new(0.75, 5, 3).split(full.labels()).unwrap();
    let train = full.select(&split.train);
    let test = full.select(&split.test);

    let recipe = RecipeConfig::default().fit(&train).unwrap();
    let first = recipe.apply(&test).unwrap();
    let second = recipe.apply(&test).unwrap();
    assert_eq!(first.values, second.values);
    assert_eq!(first.n_rows(), test.n_rows());

    let spec = ModelSpec::LogisticRegression { penalty: 0.01, mixture: 0.5 };
    let model = FittedModel::fit(spec, &RecipeConfig::default(), &train, 0).unwrap();
    assert_eq!(model.feature_names(), first.names.as_slice());
    assert!(first.names.contains(&"smoking_other".to_string()));
}

#[test]
fn test_apply_rejects_foreign_schema() {
    let train = dataset(3, 60);
    let recipe = RecipeConfig::default().fit(&train).unwrap();

    let other_schema = Schema::new(
        vec![
            ColumnSpec::numeric("age"),
            ColumnSpec::numeric("sodium"),
            ColumnSpec::categorical("smoking"),
        ],
        "outcome",
    )
    .unwrap();
    let other = Dataset::new(other_schema, train.features().clone(), train.labels().clone()).unwrap();
    assert!(matches!(recipe.apply(&other), Err(ClinicalError::SchemaError(_))));
}
