//! Parallel path simulation over a fixed worker pool.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{
    ConfigError, DimensionError, EngineConfig, Result, SimulationError, SimulationRequest,
    SimulationResult, SimulationUnit, ValidationError,
};
use crate::history::{ReturnSource, aggregate_returns, returns_panel, weight_vector};
use crate::math::dot_product;
use crate::mc::jobs::{CancellationToken, JobQueue, SimulationJob, partition_jobs};
use crate::mc::worker::WorkerResource;
use crate::stats::{StatisticalResources, build_statistical_resources};

/// Shape of one run: how many paths, how long, and from which seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPlan {
    pub iterations: usize,
    /// Periods per path.
    pub duration: usize,
    pub unit: SimulationUnit,
    pub seed: u64,
}

impl PathPlan {
    pub fn new(iterations: usize, duration: usize, unit: SimulationUnit, seed: u64) -> Self {
        Self {
            iterations,
            duration,
            unit,
            seed,
        }
    }

    pub fn from_request(request: &SimulationRequest) -> Self {
        Self::new(request.iterations, request.duration, request.unit, request.seed)
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.iterations == 0 {
            return Err(ValidationError::ZeroIterations);
        }
        if self.duration == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(())
    }
}

/// Geometric annual rate for a gross `growth` earned over `duration` periods of `unit`.
pub fn annualized_return(growth: f64, unit: SimulationUnit, duration: usize) -> f64 {
    let years = duration as f64 / f64::from(unit.periods_per_year());
    growth.powf(1.0 / years) - 1.0
}

/// Runs correlated portfolio projections.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: EngineConfig,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates `request`, loads and aligns its history from `source`, builds
    /// statistics and simulates every path.
    pub fn run<S>(&self, request: &SimulationRequest, source: &S) -> Result<Vec<SimulationResult>>
    where
        S: ReturnSource + ?Sized,
    {
        self.run_with_cancel(request, source, &CancellationToken::new())
    }

    /// [`Self::run`] that stops early once `cancel` is set.
    pub fn run_with_cancel<S>(
        &self,
        request: &SimulationRequest,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<Vec<SimulationResult>>
    where
        S: ReturnSource + ?Sized,
    {
        request.validate()?;

        let rows = source
            .fetch_returns(&request.asset_ids(), request.max_lookback_days)
            .map_err(SimulationError::Source)?;
        let series = aggregate_returns(&request.allocations, &rows)?;
        let stats = build_statistical_resources(
            &returns_panel(&series),
            request.distribution,
            request.history_frequency,
        )?;
        let weights = weight_vector(&series);

        self.simulate(
            &PathPlan::from_request(request),
            Arc::new(stats),
            &weights,
            cancel,
        )
    }

    /// Simulates `plan` from prebuilt statistics.
    ///
    /// `weights` must follow the asset order of `stats`; a length mismatch
    /// fails the run with [`SimulationError::Dimension`].
    pub fn simulate(
        &self,
        plan: &PathPlan,
        stats: Arc<StatisticalResources>,
        weights: &[f64],
        cancel: &CancellationToken,
    ) -> Result<Vec<SimulationResult>> {
        plan.validate()?;

        let batch_size = self.config.batch_size;
        let job_count = self.config.job_count(plan.iterations);
        let workers = self.config.worker_count.min(job_count);
        info!(
            duration = plan.duration,
            unit = %plan.unit,
            paths = plan.iterations,
            batch_size,
            workers,
            jobs = job_count,
            "starting simulation"
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mc-worker-{i}"))
            .build()
            .map_err(|e| SimulationError::ThreadPool(e.to_string()))?;

        let mut results: Vec<Option<SimulationResult>> =
            (0..plan.iterations).map(|_| None).collect();
        let queue = JobQueue::new(partition_jobs(&mut results, batch_size));
        let state = RunState::default();
        let initial_value = self.config.initial_value;
        let rng_kind = self.config.rng_kind;

        pool.scope(|scope| {
            for worker_index in 0..workers {
                let shared = Arc::clone(&stats);
                let (queue, state) = (&queue, &state);
                scope.spawn(move |_| {
                    let mut worker =
                        WorkerResource::new(shared, plan.seed, worker_index, rng_kind, plan.unit);
                    let paths = PathSimulator {
                        weights,
                        plan,
                        initial_value,
                    };
                    paths.drive(&mut worker, queue, cancel, state);
                });
            }
        });
        drop(queue);

        if let Some(err) = state.into_error() {
            return Err(err);
        }
        if cancel.is_cancelled() {
            warn!(paths = plan.iterations, "simulation cancelled");
            return Err(SimulationError::Cancelled);
        }

        let results = results
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(SimulationError::MissingResult { index }))
            .collect::<Result<Vec<_>>>()?;
        info!(paths = results.len(), "simulation complete");
        Ok(results)
    }
}

/// Validates, aggregates, builds statistics and simulates with the default
/// engine configuration.
pub fn run_simulation<S>(request: &SimulationRequest, source: &S) -> Result<Vec<SimulationResult>>
where
    S: ReturnSource + ?Sized,
{
    SimulationEngine::default().run(request, source)
}

/// First failure of a run, plus the flag that stops siblings from claiming
/// further jobs once it is set.
#[derive(Debug, Default)]
struct RunState {
    first_error: Mutex<Option<SimulationError>>,
    aborted: CancellationToken,
}

impl RunState {
    fn record(&self, err: SimulationError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.aborted.cancel();
    }

    fn into_error(self) -> Option<SimulationError> {
        self.first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

struct PathSimulator<'a> {
    weights: &'a [f64],
    plan: &'a PathPlan,
    initial_value: f64,
}

impl PathSimulator<'_> {
    fn drive(
        &self,
        worker: &mut WorkerResource,
        queue: &JobQueue<SimulationJob<'_>>,
        cancel: &CancellationToken,
        state: &RunState,
    ) {
        loop {
            if cancel.is_cancelled() || state.aborted.is_cancelled() {
                debug!(worker = worker.worker_index(), "stopping before next job");
                return;
            }
            let Some(mut job) = queue.next() else {
                return;
            };

            debug!(
                worker = worker.worker_index(),
                job = job.index,
                start = job.start_iteration,
                end = job.end_iteration,
                "job started"
            );
            worker.begin_job(job.index);
            if let Err(err) = self.run_job(worker, &mut job) {
                warn!(
                    worker = worker.worker_index(),
                    job = job.index,
                    error = %err,
                    "job failed, cancelling remaining jobs"
                );
                state.record(err.into());
                return;
            }
            debug!(worker = worker.worker_index(), job = job.index, "job finished");
        }
    }

    fn run_job(
        &self,
        worker: &mut WorkerResource,
        job: &mut SimulationJob<'_>,
    ) -> std::result::Result<(), DimensionError> {
        let mut draw = vec![0.0; worker.n_assets()];
        for slot in job.slots_mut() {
            *slot = Some(self.path(worker, &mut draw)?);
        }
        Ok(())
    }

    fn path(
        &self,
        worker: &mut WorkerResource,
        draw: &mut [f64],
    ) -> std::result::Result<SimulationResult, DimensionError> {
        let mut path_values = Vec::with_capacity(self.plan.duration + 1);
        let mut value = self.initial_value;
        path_values.push(value);

        for _ in 0..self.plan.duration {
            worker.sample_into(draw)?;
            let weighted = dot_product(self.weights, draw)?;
            value *= weighted.exp();
            path_values.push(value);
        }

        let growth = value / self.initial_value;
        Ok(SimulationResult {
            final_value: value,
            total_return: growth - 1.0,
            annualized_return: annualized_return(growth, self.plan.unit, self.plan.duration),
            path_values,
        })
    }
}
