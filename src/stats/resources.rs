use statrs::distribution::StudentsT;
use tracing::debug;

use crate::core::{
    FactorizationError, MatrixKind, ReturnDistribution, SimulationUnit, StatisticsError,
};
use crate::math::{
    Number, cholesky_lower, covariance_to_correlation, min_eigenvalue_symmetric,
    sample_covariance_matrix, sample_mean, sample_std_dev,
};

/// Correlation structure and marginal used by Student-t runs.
#[derive(Debug, Clone)]
pub struct GaussianCopula {
    pub correlation: Vec<Vec<f64>>,
    /// Lower-triangular factor of `correlation`.
    pub cholesky: Vec<Vec<f64>>,
    /// Standard Student-t marginal.
    pub marginal: StudentsT,
}

/// Read-only statistical summary shared by every worker of one run.
#[derive(Debug, Clone)]
pub struct StatisticalResources {
    covariance: Vec<Vec<f64>>,
    cholesky_cov: Vec<Vec<f64>>,
    mean_returns: Vec<f64>,
    std_dev: Vec<f64>,
    distribution: ReturnDistribution,
    history_frequency: SimulationUnit,
    copula: Option<GaussianCopula>,
}

/// Builds statistics from an aligned panel laid out `returns[asset][t]`.
///
/// The panel must be rectangular with at least two observations per asset.
/// Fails with [`StatisticsError::Factorization`] when the covariance (or, for
/// Student-t, the correlation) matrix has no Cholesky factor.
pub fn build_statistical_resources<T: Number>(
    returns: &[Vec<T>],
    distribution: ReturnDistribution,
    history_frequency: SimulationUnit,
) -> Result<StatisticalResources, StatisticsError> {
    check_distribution(distribution)?;

    let covariance = sample_covariance_matrix(returns)?;
    let cholesky_cov = factor(&covariance, MatrixKind::Covariance)?;

    let mean_returns = returns.iter().map(|r| sample_mean(r)).collect::<Vec<_>>();
    let std_dev = returns.iter().map(|r| sample_std_dev(r)).collect::<Vec<_>>();

    StatisticalResources::assemble(
        covariance,
        cholesky_cov,
        mean_returns,
        std_dev,
        distribution,
        history_frequency,
    )
}

impl StatisticalResources {
    /// Builds statistics from externally estimated means and covariance.
    ///
    /// Dispersions are taken from the covariance diagonal. Only the lower
    /// triangle of `covariance` is read by the factorization.
    pub fn from_covariance(
        mean_returns: Vec<f64>,
        covariance: Vec<Vec<f64>>,
        distribution: ReturnDistribution,
        history_frequency: SimulationUnit,
    ) -> Result<Self, StatisticsError> {
        check_distribution(distribution)?;

        let n = mean_returns.len();
        if n == 0 {
            return Err(StatisticsError::EmptyPanel);
        }
        if covariance.len() != n {
            return Err(StatisticsError::ShapeMismatch {
                what: "covariance",
                expected: n,
                actual: covariance.len(),
            });
        }
        if let Some(row) = covariance.iter().find(|row| row.len() != n) {
            return Err(StatisticsError::ShapeMismatch {
                what: "covariance row",
                expected: n,
                actual: row.len(),
            });
        }

        let cholesky_cov = factor(&covariance, MatrixKind::Covariance)?;
        let std_dev = (0..n).map(|i| covariance[i][i].max(0.0).sqrt()).collect();

        Self::assemble(
            covariance,
            cholesky_cov,
            mean_returns,
            std_dev,
            distribution,
            history_frequency,
        )
    }

    fn assemble(
        covariance: Vec<Vec<f64>>,
        cholesky_cov: Vec<Vec<f64>>,
        mean_returns: Vec<f64>,
        std_dev: Vec<f64>,
        distribution: ReturnDistribution,
        history_frequency: SimulationUnit,
    ) -> Result<Self, StatisticsError> {
        let copula = match distribution {
            ReturnDistribution::Normal => None,
            ReturnDistribution::StudentT { degrees_of_freedom } => {
                let correlation = covariance_to_correlation(&covariance, &std_dev);
                let cholesky = factor(&correlation, MatrixKind::Correlation)?;
                let marginal = StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|_| {
                    StatisticsError::InvalidDegreesOfFreedom {
                        value: degrees_of_freedom,
                    }
                })?;
                Some(GaussianCopula {
                    correlation,
                    cholesky,
                    marginal,
                })
            }
        };

        debug!(
            assets = mean_returns.len(),
            distribution = ?distribution,
            history_frequency = %history_frequency,
            "statistical resources built"
        );

        Ok(Self {
            covariance,
            cholesky_cov,
            mean_returns,
            std_dev,
            distribution,
            history_frequency,
            copula,
        })
    }

    pub fn n_assets(&self) -> usize {
        self.mean_returns.len()
    }

    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    /// Present for Student-t runs only.
    pub fn correlation(&self) -> Option<&[Vec<f64>]> {
        self.copula.as_ref().map(|c| c.correlation.as_slice())
    }

    /// Lower-triangular `L` with `L L^T = covariance`.
    pub fn cholesky_cov(&self) -> &[Vec<f64>] {
        &self.cholesky_cov
    }

    /// Lower-triangular factor of the correlation matrix (Student-t only).
    pub fn cholesky_corr(&self) -> Option<&[Vec<f64>]> {
        self.copula.as_ref().map(|c| c.cholesky.as_slice())
    }

    pub fn mean_returns(&self) -> &[f64] {
        &self.mean_returns
    }

    pub fn std_dev(&self) -> &[f64] {
        &self.std_dev
    }

    pub fn distribution(&self) -> ReturnDistribution {
        self.distribution
    }

    pub fn degrees_of_freedom(&self) -> Option<f64> {
        self.distribution.degrees_of_freedom()
    }

    /// Sampling frequency of the history the estimates came from.
    pub fn history_frequency(&self) -> SimulationUnit {
        self.history_frequency
    }

    /// Standard Student-t marginal (Student-t only).
    pub fn student_t(&self) -> Option<&StudentsT> {
        self.copula.as_ref().map(|c| &c.marginal)
    }

    pub fn copula(&self) -> Option<&GaussianCopula> {
        self.copula.as_ref()
    }
}

fn check_distribution(distribution: ReturnDistribution) -> Result<(), StatisticsError> {
    match distribution.degrees_of_freedom() {
        Some(value) if !(value.is_finite() && value > 0.0) => {
            Err(StatisticsError::InvalidDegreesOfFreedom { value })
        }
        _ => Ok(()),
    }
}

fn factor(matrix: &[Vec<f64>], kind: MatrixKind) -> Result<Vec<Vec<f64>>, FactorizationError> {
    cholesky_lower(matrix).ok_or_else(|| FactorizationError {
        matrix: kind,
        min_eigenvalue: min_eigenvalue_symmetric(matrix),
    })
}
