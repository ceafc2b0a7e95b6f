//! Benchmarks for column map and column aggregate expectations
//!
//! Measures dispatch plus evaluation across column sizes and result tiers.

use arrow::array::{ArrayRef, Float64Array, StringArray};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use term_expect::prelude::*;

/// Creates a dataset with the specified number of rows
///
/// Every 50th `score` is missing and every 20th `email` is malformed.
fn create_test_dataset(rows: usize) -> Dataset {
    let scores: Vec<Option<f64>> = (0..rows)
        .map(|i| (i % 50 != 0).then(|| (i % 120) as f64))
        .collect();
    let emails: Vec<Option<String>> = (0..rows)
        .map(|i| {
            if i % 20 == 0 {
                Some("invalid-email".to_string())
            } else {
                Some(format!("user{i}@example.com"))
            }
        })
        .collect();

    let table = ArrowTable::try_from_columns(vec![
        ("score", Arc::new(Float64Array::from(scores)) as ArrayRef),
        ("email", Arc::new(StringArray::from(emails)) as ArrayRef),
    ])
    .unwrap();
    Dataset::new(table).unwrap()
}

fn bench_values_between(c: &mut Criterion) {
    let mut group = c.benchmark_group("values_between");

    for rows in [1_000, 10_000, 100_000] {
        let dataset = create_test_dataset(rows);
        group.throughput(Throughput::Elements(rows as u64));

        for tier in ResultFormatTier::ALL {
            group.bench_with_input(
                BenchmarkId::new(tier.as_str(), rows),
                &dataset,
                |b, dataset| {
                    b.iter(|| {
                        let args = ExpectationArgs::new()
                            .positional("score")
                            .positional(0)
                            .positional(100)
                            .arg("mostly", 0.8)
                            .result_format(tier);
                        std::hint::black_box(
                            dataset
                                .evaluate("expect_column_values_to_be_between", args)
                                .unwrap(),
                        )
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_regex(c: &mut Criterion) {
    let mut group = c.benchmark_group("values_match_regex");
    let dataset = create_test_dataset(10_000);

    group.bench_function("email_pattern", |b| {
        b.iter(|| {
            let args = ExpectationArgs::new()
                .positional("email")
                .positional(r"^[^@\s]+@[^@\s]+\.[a-z]+$");
            std::hint::black_box(
                dataset
                    .evaluate("expect_column_values_to_match_regex", args)
                    .unwrap(),
            )
        })
    });

    group.finish();
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_aggregate");
    let dataset = create_test_dataset(100_000);

    for name in [
        "expect_column_median_to_be_between",
        "expect_column_mean_to_be_between",
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let args = ExpectationArgs::new()
                    .positional("score")
                    .positional(0)
                    .positional(100);
                std::hint::black_box(dataset.evaluate(name, args).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_values_between, bench_regex, bench_aggregates);
criterion_main!(benches);
