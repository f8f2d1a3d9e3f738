use clinical_ml::data::{Dataset, Schema};
use clinical_ml::preprocessing::RecipeConfig;
use clinical_ml::training::{
    FittedModel, ForestGrid, HyperparameterGrid, LogisticGrid, ModelSpec, ModelTuner, StratifiedSplitter,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_clinical_data(n_rows: usize) -> Dataset {
    let schema = Schema::heart_failure();
    let categorical = schema.categorical_indices();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let x = Array2::from_shape_fn((n_rows, schema.n_predictors()), |(_, j)| {
        if categorical.contains(&j) {
            f64::from(rng.gen_bool(0.4) as u8)
        } else {
            rng.gen::<f64>() * 100.0
        }
    });
    // Outcome driven by ejection_fraction and time
    let y = Array1::from_shape_fn(n_rows, |i| {
        let risk = (50.0 - x[[i, 4]]) / 25.0 + (50.0 - x[[i, 11]]) / 25.0;
        if risk + rng.gen::<f64>() - 0.5 > 0.0 { 1.0 } else { 0.0 }
    });

    Dataset::new(schema, x, y).unwrap()
}

fn bench_tuning(c: &mut Criterion) {
    let mut group = c.benchmark_group("tuning");
    group.sample_size(10); // Grid search is slow

    let data = create_clinical_data(300);
    let folds = StratifiedSplitter::new(0.75, 5, 42).folds(data.labels()).unwrap();
    let grids = [
        ("logistic", HyperparameterGrid::LogisticRegression(LogisticGrid::regular(5, 3))),
        ("forest", HyperparameterGrid::RandomForest(ForestGrid::default().with_tree_count(100))),
    ];

    for (name, grid) in grids.iter() {
        group.bench_with_input(BenchmarkId::new("grid_search", name), grid, |b, grid| {
            b.iter(|| {
                ModelTuner::new(RecipeConfig::default(), grid.clone())
                    .tune(black_box(&data), &folds)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    for n_rows in [300, 1000, 3000].iter() {
        let data = create_clinical_data(*n_rows);
        let specs = [
            ("logistic", ModelSpec::LogisticRegression { penalty: 0.01, mixture: 0.5 }),
            ("forest", ModelSpec::RandomForest { mtry: 4, min_node_size: 10, tree_count: 100 }),
        ];

        for (name, spec) in specs {
            group.bench_with_input(BenchmarkId::new(name, n_rows), &data, |b, data| {
                b.iter(|| FittedModel::fit(spec, &RecipeConfig::default(), black_box(data), 42).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_tuning, bench_fit);
criterion_main!(benches);
