//! Monte Carlo portfolio simulation.
//!
//! A run partitions its paths into contiguous jobs, hands them to a fixed pool
//! of workers through a bounded queue and assembles one [`SimulationResult`]
//! per path. Each worker owns its generator and reads the shared
//! [`StatisticalResources`] without locking.
//!
//! Numerical considerations: each path compounds `exp(w . r)` per period, so
//! simulated values stay positive. Per-path results depend only on the seed,
//! the batch size and the path index, never on the worker count.
//!
//! [`SimulationResult`]: crate::core::SimulationResult
//! [`StatisticalResources`]: crate::stats::StatisticalResources

pub mod engine;
pub mod jobs;
pub mod worker;

pub use engine::{PathPlan, SimulationEngine, annualized_return, run_simulation};
pub use jobs::{CancellationToken, JobQueue, SimulationJob, partition_jobs};
pub use worker::WorkerResource;
