//! Engine configuration.
//!
//! Configuration is fixed for the lifetime of a [`crate::mc::SimulationEngine`].
//! It can be built programmatically or parsed from a JSON document, in which
//! case missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::math::FastRngKind;

/// Default number of worker threads.
pub const DEFAULT_WORKER_COUNT: usize = 8;
/// Default number of paths per job.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;
/// Default baseline portfolio value every path starts from.
pub const DEFAULT_INITIAL_VALUE: f64 = 100.0;

/// Simulation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on concurrently running workers
    pub worker_count: usize,
    /// Paths per job
    pub batch_size: usize,
    /// Portfolio value at the start of every path
    pub initial_value: f64,
    /// Generator family used by every worker
    pub rng_kind: FastRngKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            initial_value: DEFAULT_INITIAL_VALUE,
            rng_kind: FastRngKind::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    pub fn with_rng_kind(mut self, rng_kind: FastRngKind) -> Self {
        self.rng_kind = rng_kind;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !(self.initial_value.is_finite() && self.initial_value > 0.0) {
            return Err(ConfigError::InvalidInitialValue {
                value: self.initial_value,
            });
        }
        Ok(())
    }

    /// Number of jobs needed to cover `iterations` paths.
    pub fn job_count(&self, iterations: usize) -> usize {
        iterations.div_ceil(self.batch_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.initial_value, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn job_count_rounds_up() {
        let config = EngineConfig::default();
        assert_eq!(config.job_count(50_000), 5);
        assert_eq!(config.job_count(50_001), 6);
        assert_eq!(config.job_count(1), 1);
        assert_eq!(config.job_count(0), 0);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json(r#"{"worker_count": 4, "rng_kind": "pcg64"}"#).unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.rng_kind, FastRngKind::Pcg64);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            EngineConfig::default().with_worker_count(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
        assert_eq!(
            EngineConfig::default().with_batch_size(0).validate(),
            Err(ConfigError::ZeroBatchSize)
        );
        assert!(matches!(
            EngineConfig::default().with_initial_value(-1.0).validate(),
            Err(ConfigError::InvalidInitialValue { .. })
        ));
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
