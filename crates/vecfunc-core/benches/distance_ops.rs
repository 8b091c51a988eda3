//! Benchmarks for the distance kernels

use std::sync::Arc;

use arrow::array::{ArrayRef, ListArray};
use arrow::datatypes::Float64Type;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use vecfunc_core::distance::{cosine_similarity, l2_distance, DistanceAlgorithm};
use vecfunc_core::list::list_distance;

fn random_vector(dim: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen()).collect()
}

fn random_lists(rows: usize, dim: usize) -> ArrayRef {
    Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(
        (0..rows).map(|_| Some(random_vector(dim).into_iter().map(Some))),
    ))
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine_similarity");

    for dim in [128, 256, 512, 1024] {
        let a = random_vector(dim);
        let b = random_vector(dim);

        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bench, _| {
            bench.iter(|| cosine_similarity(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_l2_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("l2_distance");

    for dim in [128, 256, 512, 1024] {
        let a = random_vector(dim);
        let b = random_vector(dim);

        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |bench, _| {
            bench.iter(|| l2_distance(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

fn bench_list_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_distance");

    let dim = 128;
    for rows in [1_000, 10_000] {
        let left = random_lists(rows, dim);
        let right = random_lists(rows, dim);

        group.bench_with_input(BenchmarkId::new("serial", rows), &rows, |bench, _| {
            bench.iter(|| {
                list_distance(
                    black_box(&left),
                    black_box(&right),
                    DistanceAlgorithm::CosineDistance,
                    usize::MAX,
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("parallel", rows), &rows, |bench, _| {
            bench.iter(|| {
                list_distance(
                    black_box(&left),
                    black_box(&right),
                    DistanceAlgorithm::CosineDistance,
                    1,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cosine_similarity,
    bench_l2_distance,
    bench_list_distance
);
criterion_main!(benches);
