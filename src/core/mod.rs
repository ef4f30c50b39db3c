//! Core request/result types, validation, configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::EngineConfig;
pub use error::{
    AlignmentError, BoxError, ConfigError, DimensionError, FactorizationError, MatrixKind, Result,
    SimulationError, StatisticsError, ValidationError,
};
pub use types::*;
pub use validation::validate;
