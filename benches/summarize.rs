use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rusty_stats::data::model::{Column, Dataset};
use rusty_stats::summary::{bivariate, summarize, univariate};

/// `numeric` float columns and `categorical` low-cardinality columns, ~5% missing.
fn synthetic(rows: usize, numeric: usize, categorical: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(7);
    let mut columns = Vec::with_capacity(numeric + categorical);

    for i in 0..numeric {
        let values = (0..rows)
            .map(|_| rng.gen_bool(0.95).then(|| rng.gen_range(0.0..10_000.0)))
            .collect();
        columns.push(Column::numeric(format!("num_{i}"), values));
    }
    for i in 0..categorical {
        let values = (0..rows)
            .map(|_| {
                rng.gen_bool(0.95)
                    .then(|| format!("level_{}", rng.gen_range(0..12)))
            })
            .collect();
        columns.push(Column::categorical(format!("cat_{i}"), values));
    }
    Dataset::new(columns).expect("synthetic columns are consistent")
}

fn bench_univariate(c: &mut Criterion) {
    let dataset = synthetic(100_000, 1, 1);
    let numeric = &dataset.columns()[0];
    let categorical = &dataset.columns()[1];

    c.bench_function("univariate_numeric_100k", |b| {
        b.iter(|| univariate::summarize_column(black_box(numeric)))
    });
    c.bench_function("univariate_categorical_100k", |b| {
        b.iter(|| univariate::summarize_column(black_box(categorical)))
    });
}

fn bench_pairs(c: &mut Criterion) {
    let dataset = synthetic(20_000, 2, 2);
    let cols = dataset.columns();

    c.bench_function("pearson_20k", |b| {
        b.iter(|| bivariate::associate(black_box(&cols[0]), black_box(&cols[1])))
    });
    c.bench_function("cramers_v_20k", |b| {
        b.iter(|| bivariate::associate(black_box(&cols[2]), black_box(&cols[3])))
    });
    c.bench_function("correlation_ratio_20k", |b| {
        b.iter(|| bivariate::associate(black_box(&cols[0]), black_box(&cols[2])))
    });
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    group.sample_size(20);
    for width in [4usize, 8, 16] {
        let dataset = synthetic(10_000, width / 2, width / 2);
        group.bench_with_input(BenchmarkId::from_parameter(width), &dataset, |b, ds| {
            b.iter(|| summarize(black_box(ds)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_univariate, bench_pairs, bench_summarize);
criterion_main!(benches);
