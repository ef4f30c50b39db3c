//! Per-worker sampling state.

use std::sync::Arc;

use statrs::distribution::ContinuousCDF;

use crate::core::{DimensionError, SimulationUnit};
use crate::math::{FastRng, FastRngKind, clamp_probability, lower_mul_vec, norm_cdf};
use crate::stats::StatisticalResources;

/// Shared statistics plus a generator owned by exactly one worker.
///
/// A worker starts on stream `(seed, worker_index)`; the engine moves it to
/// stream `(seed, job_index)` at every job boundary with [`Self::begin_job`].
#[derive(Debug)]
pub struct WorkerResource {
    shared: Arc<StatisticalResources>,
    rng: FastRng,
    kind: FastRngKind,
    base_seed: u64,
    worker_index: usize,
    z: Vec<f64>,
    w: Vec<f64>,
    mean_scale: f64,
    dispersion_scale: f64,
}

impl WorkerResource {
    /// `unit` is the simulated period; draws are rescaled from the history's
    /// sampling frequency to it.
    pub fn new(
        shared: Arc<StatisticalResources>,
        base_seed: u64,
        worker_index: usize,
        kind: FastRngKind,
        unit: SimulationUnit,
    ) -> Self {
        let n = shared.n_assets();
        let h = unit.periods_of(shared.history_frequency());
        Self {
            rng: FastRng::for_stream(kind, base_seed, worker_index as u64),
            shared,
            kind,
            base_seed,
            worker_index,
            z: vec![0.0; n],
            w: vec![0.0; n],
            mean_scale: h,
            dispersion_scale: h.sqrt(),
        }
    }

    pub fn worker_index(&self) -> usize {
        self.worker_index
    }

    pub fn n_assets(&self) -> usize {
        self.shared.n_assets()
    }

    /// Re-keys the generator onto the stream reserved for `job_index`.
    pub fn begin_job(&mut self, job_index: usize) {
        self.rng = FastRng::for_stream(self.kind, self.base_seed, job_index as u64);
    }

    /// Writes one correlated per-period return vector into `out`.
    ///
    /// Normal: `L_cov z + mean`. Student-t: `F_nu^-1(Phi(L_corr z)) * sigma + mean`.
    pub fn sample_into(&mut self, out: &mut [f64]) -> Result<(), DimensionError> {
        let n = self.shared.n_assets();
        if out.len() != n {
            return Err(DimensionError {
                expected: n,
                actual: out.len(),
            });
        }

        self.rng.fill_standard_normal(&mut self.z);
        let stats = &*self.shared;
        let means = stats.mean_returns();

        match stats.copula() {
            None => {
                lower_mul_vec(stats.cholesky_cov(), &self.z, &mut self.w);
                for ((o, &y), &mu) in out.iter_mut().zip(self.w.iter()).zip(means.iter()) {
                    *o = y.mul_add(self.dispersion_scale, mu * self.mean_scale);
                }
            }
            Some(copula) => {
                lower_mul_vec(&copula.cholesky, &self.z, &mut self.w);
                for (i, o) in out.iter_mut().enumerate() {
                    let u = clamp_probability(norm_cdf(self.w[i]));
                    let t = copula.marginal.inverse_cdf(u);
                    let scaled_mean = means[i] * self.mean_scale;
                    *o = (t * stats.std_dev()[i]).mul_add(self.dispersion_scale, scaled_mean);
                }
            }
        }
        Ok(())
    }

    /// Allocating convenience over [`Self::sample_into`].
    pub fn correlated_returns(&mut self) -> Result<Vec<f64>, DimensionError> {
        let mut out = vec![0.0; self.n_assets()];
        self.sample_into(&mut out)?;
        Ok(out)
    }
}
