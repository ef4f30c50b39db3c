//! mcfolio projects the future value of a multi-asset portfolio by Monte Carlo
//! simulation of correlated per-period returns.
//!
//! Historical log-returns are aligned per asset, summarised into means,
//! dispersions, covariance/correlation matrices and their Cholesky factors,
//! then sampled under a multivariate normal or a Student-t Gaussian-copula
//! model by a fixed pool of workers. Every path starts from a baseline value
//! and compounds `exp(w . r)` each period.
//!
//! References used across modules include:
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, Ch. 2.
//! - Golub and Van Loan, *Matrix Computations* (4th ed.), Sec. 4.2.
//! - Cherubini, Luciano and Vecchiato (2004), *Copula Methods in Finance*.
//!
//! Numerical considerations:
//! - Covariance and dispersion both use the `n - 1` estimator.
//! - Factorization is strict: singular or indefinite matrices are rejected
//!   rather than regularized.
//! - For a fixed seed and batch size results are bit-identical regardless of
//!   the number of workers.
//!
//! # Quick Start
//! ```rust
//! use chrono::{Days, NaiveDate};
//! use mcfolio::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
//! let mut source = InMemoryReturnSource::default();
//! for week in 0..60_u64 {
//!     let date = start + Days::new(7 * week);
//!     let x = (week as f64 * 0.7).sin() * 0.02;
//!     let y = (week as f64 * 1.3).cos() * 0.03;
//!     source.push(ReturnObservation::new(1, date, 0.001 + x));
//!     source.push(ReturnObservation::new(2, date, 0.002 + 0.5 * x + y));
//! }
//!
//! let request = SimulationRequest::new(
//!     vec![
//!         AssetAllocation::new(1, "AAA", 0.6),
//!         AssetAllocation::new(2, "BBB", 0.4),
//!     ],
//!     1_000,
//!     52,
//!     42,
//! );
//! let results = run_simulation(&request, &source).unwrap();
//! assert_eq!(results.len(), 1_000);
//! assert_eq!(results[0].path_values.len(), 53);
//! assert_eq!(results[0].path_values[0], 100.0);
//! ```

pub mod core;
pub mod history;
pub mod math;
pub mod mc;
pub mod stats;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{
        AlignmentError, AssetAllocation, AssetId, EngineConfig, ReturnDistribution,
        SimulationError, SimulationRequest, SimulationResult, SimulationUnit, StatisticsError,
        ValidationError,
    };
    pub use crate::history::{InMemoryReturnSource, ReturnObservation, ReturnSource, SeriesReturns};
    pub use crate::mc::{CancellationToken, PathPlan, SimulationEngine, run_simulation};
    pub use crate::stats::{StatisticalResources, build_statistical_resources};
}
