//! Error types for request validation, history alignment, statistics and
//! simulation runs.

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::types::AssetId;

/// Boxed error returned by storage collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`SimulationError`].
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Structural problems with a simulation request. Fully recoverable by
/// resubmitting a corrected request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("weights must sum to 1.0, got {sum:.6}")]
    WeightSum { sum: f64 },

    #[error("asset id {asset_id} is allocated more than once")]
    DuplicateAsset { asset_id: AssetId },

    #[error("iteration count must be positive")]
    ZeroIterations,

    #[error("simulation duration must be positive")]
    ZeroDuration,

    #[error("student-t degrees of freedom must be finite and positive, got {value}")]
    InvalidDegreesOfFreedom { value: f64 },
}

/// Historical series that cannot be lined up against each other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("no historical returns to align")]
    Empty,

    #[error("no historical returns for asset {asset_id}")]
    MissingHistory { asset_id: AssetId },

    #[error("first dates do not align: asset {asset_id} starts {actual}, expected {expected}")]
    FirstDate {
        asset_id: AssetId,
        expected: NaiveDate,
        actual: NaiveDate,
    },

    #[error("last dates do not align: asset {asset_id} ends {actual}, expected {expected}")]
    LastDate {
        asset_id: AssetId,
        expected: NaiveDate,
        actual: NaiveDate,
    },

    #[error("series lengths do not align: asset {asset_id} has {actual} returns, expected {expected}")]
    Length {
        asset_id: AssetId,
        expected: usize,
        actual: usize,
    },
}

/// Which matrix a factorization was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    Covariance,
    Correlation,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Covariance => f.write_str("covariance"),
            Self::Correlation => f.write_str("correlation"),
        }
    }
}

/// A matrix that has no real Cholesky factor.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{matrix} matrix is not positive definite (min eigenvalue: {min_eigenvalue:?})")]
pub struct FactorizationError {
    pub matrix: MatrixKind,
    /// Smallest eigenvalue, when it could be computed.
    pub min_eigenvalue: Option<f64>,
}

/// Failures while turning aligned history into [`crate::stats::StatisticalResources`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    #[error("return panel is empty")]
    EmptyPanel,

    #[error("insufficient history: need at least {required} returns per asset, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("return series {asset} has {actual} observations, expected {expected}")]
    RaggedPanel {
        asset: usize,
        expected: usize,
        actual: usize,
    },

    #[error("return series {asset} contains non-finite values")]
    NonFiniteReturn { asset: usize },

    #[error("{what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("student-t degrees of freedom must be finite and positive, got {value}")]
    InvalidDegreesOfFreedom { value: f64 },

    #[error(transparent)]
    Factorization(#[from] FactorizationError),
}

/// Weight vector and return vector disagree in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dimension mismatch: expected {expected} elements, got {actual}")]
pub struct DimensionError {
    pub expected: usize,
    pub actual: usize,
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("worker count must be positive")]
    ZeroWorkers,

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error("initial portfolio value must be finite and positive, got {value}")]
    InvalidInitialValue { value: f64 },

    #[error("could not parse engine configuration: {0}")]
    Parse(String),
}

/// Run-level failure. No partial results accompany any of these.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("historical data validation failed: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("statistics could not be built: {0}")]
    Statistics(#[from] StatisticsError),

    #[error("path simulation failed: {0}")]
    Dimension(#[from] DimensionError),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("error getting time series returns: {0}")]
    Source(#[source] BoxError),

    #[error("worker pool could not be started: {0}")]
    ThreadPool(String),

    #[error("simulation run was cancelled")]
    Cancelled,

    #[error("no result was produced for path {index}")]
    MissingResult { index: usize },
}

impl From<FactorizationError> for SimulationError {
    fn from(err: FactorizationError) -> Self {
        Self::Statistics(StatisticsError::Factorization(err))
    }
}

impl SimulationError {
    /// `true` for errors the caller can fix by resubmitting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
