mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_abs_diff_eq;
use chrono::Days;
use mcfolio::core::BoxError;
use mcfolio::history::{aggregate_returns, returns_panel};
use mcfolio::math::FastRngKind;
use mcfolio::prelude::*;

use common::{first_date, request, weekly_source};

/// Annual log drift of the portfolio implied by the stored weekly history.
fn estimated_annual_drift(source: &InMemoryReturnSource, req: &SimulationRequest) -> f64 {
    let rows = source.fetch_returns(&req.asset_ids(), req.max_lookback_days).unwrap();
    let series = aggregate_returns(&req.allocations, &rows).unwrap();
    let stats = build_statistical_resources(
        &returns_panel(&series),
        ReturnDistribution::Normal,
        SimulationUnit::Weekly,
    )
    .unwrap();
    52.0 * series
        .iter()
        .zip(stats.mean_returns())
        .map(|(s, mu)| s.weight * mu)
        .sum::<f64>()
}

fn engine(workers: usize) -> SimulationEngine {
    SimulationEngine::new(EngineConfig::default().with_worker_count(workers)).unwrap()
}

#[test]
fn fifty_thousand_paths_fill_every_index_for_any_pool_size() {
    let source = weekly_source(520, 1);
    let req = request(50_000, 26, 42);

    let mut reference: Option<Vec<SimulationResult>> = None;
    for workers in [1, 4, 64] {
        let results = engine(workers).run(&req, &source).unwrap();
        assert_eq!(results.len(), 50_000);
        for r in &results {
            assert_eq!(r.path_values.len(), 27);
            assert_eq!(r.path_values[0], 100.0);
            assert!(r.final_value > 0.0);
        }
        match &reference {
            None => reference = Some(results),
            Some(expected) => assert_eq!(expected, &results, "workers={workers}"),
        }
    }
}

#[test]
fn same_seed_is_bit_identical_and_different_seed_differs() {
    let source = weekly_source(260, 2);
    let engine = SimulationEngine::new(
        EngineConfig::default()
            .with_worker_count(4)
            .with_batch_size(250),
    )
    .unwrap();

    let a = engine.run(&request(2_000, 12, 7), &source).unwrap();
    let b = engine.run(&request(2_000, 12, 7), &source).unwrap();
    let c = engine.run(&request(2_000, 12, 8), &source).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn every_generator_kind_is_deterministic() {
    let source = weekly_source(104, 3);
    for kind in [
        FastRngKind::Xoshiro256PlusPlus,
        FastRngKind::Pcg64,
        FastRngKind::StdRng,
    ] {
        let config = EngineConfig::default()
            .with_rng_kind(kind)
            .with_batch_size(100);
        let one = SimulationEngine::new(config.clone().with_worker_count(1)).unwrap();
        let many = SimulationEngine::new(config.with_worker_count(6)).unwrap();
        let req = request(1_000, 8, 99);
        assert_eq!(one.run(&req, &source).unwrap(), many.run(&req, &source).unwrap());
    }
}

#[test]
fn mean_terminal_growth_matches_portfolio_drift() {
    let source = weekly_source(520, 4);
    let req = request(20_000, 52, 11);
    let drift = estimated_annual_drift(&source, &req);
    let results = engine(8).run(&req, &source).unwrap();

    let mean_log_growth = results
        .iter()
        .map(|r| (r.final_value / 100.0).ln())
        .sum::<f64>()
        / results.len() as f64;
    assert_abs_diff_eq!(mean_log_growth, drift, epsilon = 0.005);

    for r in results.iter().take(100) {
        assert_abs_diff_eq!(r.annualized_return, r.total_return, epsilon = 1e-9);
    }
}

#[test]
fn yearly_unit_rescales_weekly_history() {
    let source = weekly_source(520, 5);
    let req = request(5_000, 2, 3).with_unit(SimulationUnit::Yearly);
    let drift = estimated_annual_drift(&source, &req);
    let results = engine(4).run(&req, &source).unwrap();

    let mean_log_growth = results
        .iter()
        .map(|r| (r.final_value / 100.0).ln())
        .sum::<f64>()
        / results.len() as f64;
    assert_abs_diff_eq!(mean_log_growth, 2.0 * drift, epsilon = 0.015);
    for r in &results {
        let growth = r.final_value / 100.0;
        assert_abs_diff_eq!(r.annualized_return, growth.sqrt() - 1.0, epsilon = 1e-12);
    }
}

#[test]
fn monthly_unit_scales_by_declared_history_frequency() {
    let source = weekly_source(520, 12);
    let monthly = request(20_000, 1, 21).with_unit(SimulationUnit::Monthly);
    let drift = estimated_annual_drift(&source, &monthly);
    let mean_log_growth = |req: &SimulationRequest| {
        let results = engine(4).run(req, &source).unwrap();
        results
            .iter()
            .map(|r| (r.final_value / 100.0).ln())
            .sum::<f64>()
            / results.len() as f64
    };

    // Undeclared history is read as weekly: one month is 52 / 12 weeks of drift.
    assert_abs_diff_eq!(mean_log_growth(&monthly), drift / 12.0, epsilon = 0.001);

    let declared = monthly.with_history_frequency(SimulationUnit::Monthly);
    assert_abs_diff_eq!(mean_log_growth(&declared), drift / 52.0, epsilon = 0.001);
}

#[test]
fn student_t_runs_produce_complete_results() {
    let source = weekly_source(520, 6);
    let req = request(2_000, 13, 5).with_distribution(ReturnDistribution::StudentT {
        degrees_of_freedom: 5.0,
    });
    let engine = SimulationEngine::new(
        EngineConfig::default()
            .with_worker_count(4)
            .with_batch_size(300),
    )
    .unwrap();

    let first = engine.run(&req, &source).unwrap();
    let second = engine.run(&req, &source).unwrap();
    assert_eq!(first.len(), 2_000);
    assert!(first.iter().all(|r| r.path_values.len() == 14));
    assert_eq!(first, second);
}

#[test]
fn invalid_request_fails_before_touching_storage() {
    struct CountingSource(AtomicUsize);
    impl ReturnSource for CountingSource {
        fn fetch_returns(
            &self,
            _: &[AssetId],
            _: u32,
        ) -> Result<Vec<ReturnObservation>, BoxError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    let source = CountingSource(AtomicUsize::new(0));
    let mut req = request(10, 4, 1);
    req.allocations[0].weight = 0.6;
    let err = run_simulation(&req, &source).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Validation(ValidationError::WeightSum { .. })
    ));
    assert!(err.is_recoverable());
    assert_eq!(source.0.load(Ordering::SeqCst), 0);
}

#[test]
fn storage_errors_are_surfaced() {
    struct FailingSource;
    impl ReturnSource for FailingSource {
        fn fetch_returns(
            &self,
            _: &[AssetId],
            _: u32,
        ) -> Result<Vec<ReturnObservation>, BoxError> {
            Err("connection refused".into())
        }
    }

    let err = run_simulation(&request(10, 4, 1), &FailingSource).unwrap_err();
    assert!(matches!(err, SimulationError::Source(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn misaligned_history_fails_the_run() {
    let mut source = weekly_source(104, 7);
    source.push(ReturnObservation::new(
        2,
        first_date() + Days::new(7 * 104),
        0.01,
    ));
    let err = run_simulation(&request(100, 4, 1), &source).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Alignment(AlignmentError::LastDate { asset_id: 2, .. })
    ));
}

#[test]
fn collinear_history_fails_factorization() {
    let base = weekly_source(104, 8);
    let rows = base.fetch_returns(&[1], 3_650).unwrap();
    let mut source = InMemoryReturnSource::default();
    for row in rows {
        source.push(row);
        source.push(ReturnObservation::new(2, row.timestamp, row.log_return));
    }
    let req = SimulationRequest::new(
        vec![
            AssetAllocation::new(1, "AAA", 0.5),
            AssetAllocation::new(2, "AAA2", 0.5),
        ],
        100,
        4,
        1,
    );
    let err = run_simulation(&req, &source).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Statistics(StatisticsError::Factorization(_))
    ));
}

#[test]
fn cancellation_returns_no_partial_results() {
    let source = weekly_source(104, 9);
    let token = CancellationToken::new();
    token.cancel();
    let err = engine(4)
        .run_with_cancel(&request(50_000, 52, 1), &source, &token)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Cancelled));
}
