use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mcfolio::math::FastRngKind;
use mcfolio::math::numeric::matrix_from_fn;
use mcfolio::mc::WorkerResource;
use mcfolio::prelude::*;

// Portfolio simulation benchmarks
// Goals:
// - Throughput should scale with workers until the job count is reached
// - Xoshiro256++ should be faster than StdRng
// - Student-t draws cost more than normal draws (inverse CDF per asset)

const N_ASSETS: usize = 8;

fn benchmark_stats(distribution: ReturnDistribution) -> Arc<StatisticalResources> {
    let cov = matrix_from_fn(N_ASSETS, N_ASSETS, |i, j| {
        let rho = if i == j { 1.0 } else { 0.3 };
        rho * 0.02 * 0.02
    });
    Arc::new(
        StatisticalResources::from_covariance(
            vec![0.0015; N_ASSETS],
            cov,
            distribution,
            SimulationUnit::Weekly,
        )
        .expect("benchmark covariance should be positive definite"),
    )
}

fn weights() -> Vec<f64> {
    vec![1.0 / N_ASSETS as f64; N_ASSETS]
}

fn bench_correlated_draws(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlated_draws");

    for (name, distribution) in [
        ("normal", ReturnDistribution::Normal),
        (
            "student_t",
            ReturnDistribution::StudentT {
                degrees_of_freedom: 5.0,
            },
        ),
    ] {
        let mut worker = WorkerResource::new(
            benchmark_stats(distribution),
            42,
            0,
            FastRngKind::default(),
            SimulationUnit::Weekly,
        );
        let mut out = vec![0.0; N_ASSETS];
        group.bench_function(name, |b| {
            b.iter(|| {
                worker.sample_into(black_box(&mut out)).expect("sized buffer");
                black_box(out[0])
            })
        });
    }

    group.finish();
}

fn bench_worker_scaling(c: &mut Criterion) {
    let stats = benchmark_stats(ReturnDistribution::Normal);
    let weights = weights();
    let plan = PathPlan::new(40_000, 52, SimulationUnit::Weekly, 42);
    let mut group = c.benchmark_group("worker_scaling");
    group.sample_size(10);

    for workers in [1, 2, 4, 8].iter() {
        let engine = SimulationEngine::new(
            EngineConfig::default()
                .with_worker_count(*workers)
                .with_batch_size(5_000),
        )
        .expect("valid config");
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, _| {
            b.iter(|| {
                let results = engine
                    .simulate(
                        black_box(&plan),
                        Arc::clone(&stats),
                        black_box(&weights),
                        &CancellationToken::new(),
                    )
                    .expect("simulation should succeed");
                black_box(results.len())
            })
        });
    }

    group.finish();
}

fn bench_rng_kinds(c: &mut Criterion) {
    let stats = benchmark_stats(ReturnDistribution::Normal);
    let weights = weights();
    let plan = PathPlan::new(10_000, 52, SimulationUnit::Weekly, 7);
    let mut group = c.benchmark_group("rng_kinds");
    group.sample_size(10);

    for kind in [
        FastRngKind::Xoshiro256PlusPlus,
        FastRngKind::Pcg64,
        FastRngKind::StdRng,
    ] {
        let engine = SimulationEngine::new(
            EngineConfig::default()
                .with_worker_count(1)
                .with_rng_kind(kind),
        )
        .expect("valid config");
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter(|| {
                let results = engine
                    .simulate(
                        &plan,
                        Arc::clone(&stats),
                        &weights,
                        &CancellationToken::new(),
                    )
                    .expect("simulation should succeed");
                black_box(results[0].final_value)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_correlated_draws,
    bench_worker_scaling,
    bench_rng_kinds
);
criterion_main!(benches);
