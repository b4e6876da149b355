use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use liftstat::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;

fn engine(kind: BackendKind) -> Engine {
    Engine::new(0.95).unwrap().with_backend(kind)
}

fn random_comparisons(n: usize) -> Vec<Comparison> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                let mut group = || MeanSummary::new(rng.gen_range(50.0..150.0), rng.gen_range(1.0..30.0), rng.gen_range(2..2_000));
                Comparison::Continuous { treatment: group(), control: group() }
            } else {
                let mut group = || {
                    let total = rng.gen_range(1..100_000);
                    RateSummary::new(rng.gen_range(0..=total), total)
                };
                Comparison::Rate { treatment: group(), control: group() }
            }
        })
        .collect()
}

/// 1. SINGLE TESTS per backend
fn bench_single_tests(c: &mut Criterion) {
    let means = MeanComparison::new(MeanSummary::new(100.0, 15.0, 50), MeanSummary::new(85.0, 12.0, 50));
    let rates = ProportionComparison::new(RateSummary::new(150, 1000), RateSummary::new(100, 1000));

    let mut group = c.benchmark_group("test");
    for kind in BackendKind::RANKED {
        let e = engine(kind);
        let name = e.backend().name();
        group.bench_with_input(BenchmarkId::new("welch", name), &means, |b, input| {
            b.iter(|| black_box(e.compare_means(black_box(input))))
        });
        group.bench_with_input(BenchmarkId::new("two_proportion", name), &rates, |b, input| {
            b.iter(|| black_box(e.compare_proportions(black_box(input))))
        });
    }
    group.finish();
}

/// 2. PLANNER
fn bench_planner(c: &mut Criterion) {
    let e = engine(BackendKind::Statrs);
    c.bench_function("plan/0.05_0.15", |b| {
        b.iter(|| black_box(e.plan(black_box(0.05), black_box(0.15), 0.8)))
    });
}

/// 3. BATCH (scaling test with multiple sizes)
fn bench_batch(c: &mut Criterion) {
    let e = engine(BackendKind::Statrs);
    let mut group = c.benchmark_group("analyze_batch");
    for &size in &[100, 1_000, 10_000] {
        let comparisons = random_comparisons(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &comparisons, |b, input| {
            b.iter(|| black_box(e.analyze_batch(black_box(input))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_tests, bench_planner, bench_batch);
criterion_main!(benches);
