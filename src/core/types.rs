use serde::{Deserialize, Serialize};

/// Storage identifier of an asset.
pub type AssetId = i32;

/// Default history window when a request does not specify one (ten years).
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 3_650;

/// One portfolio line: which asset and how much of the portfolio it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub id: AssetId,
    pub ticker: String,
    pub weight: f64,
}

impl AssetAllocation {
    pub fn new(id: AssetId, ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            id,
            ticker: ticker.into(),
            weight,
        }
    }
}

/// Marginal model for simulated per-period returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReturnDistribution {
    /// Multivariate normal with the historical covariance.
    #[default]
    Normal,
    /// Student-t marginals joined by a Gaussian copula on the historical correlation.
    StudentT { degrees_of_freedom: f64 },
}

impl ReturnDistribution {
    pub fn degrees_of_freedom(self) -> Option<f64> {
        match self {
            Self::Normal => None,
            Self::StudentT { degrees_of_freedom } => Some(degrees_of_freedom),
        }
    }
}

/// Calendar unit for simulation periods and for historical sampling frequency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationUnit {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl SimulationUnit {
    /// Periods per year: 252 trading days, 52 weeks, 12 months, 4 quarters, 1 year.
    pub const fn periods_per_year(self) -> u32 {
        match self {
            Self::Daily => 252,
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 1,
        }
    }

    /// Number of `other` periods contained in one `self` period.
    pub fn periods_of(self, other: SimulationUnit) -> f64 {
        f64::from(other.periods_per_year()) / f64::from(self.periods_per_year())
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for SimulationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run one projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub allocations: Vec<AssetAllocation>,
    /// Number of independent paths.
    pub iterations: usize,
    pub seed: u64,
    #[serde(default)]
    pub distribution: ReturnDistribution,
    /// Length of one simulated period.
    #[serde(default)]
    pub unit: SimulationUnit,
    /// Number of `unit` periods per path.
    pub duration: usize,
    /// Sampling frequency of the stored historical returns.
    #[serde(default)]
    pub history_frequency: SimulationUnit,
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}

impl SimulationRequest {
    /// Weekly normal projection over `duration` weeks.
    pub fn new(
        allocations: Vec<AssetAllocation>,
        iterations: usize,
        duration: usize,
        seed: u64,
    ) -> Self {
        Self {
            allocations,
            iterations,
            seed,
            distribution: ReturnDistribution::Normal,
            unit: SimulationUnit::Weekly,
            duration,
            history_frequency: SimulationUnit::Weekly,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }

    pub fn with_distribution(mut self, distribution: ReturnDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Sets the simulated period.
    ///
    /// Draws are rescaled from `history_frequency` (weekly unless set with
    /// [`Self::with_history_frequency`]) to `unit`: means by
    /// `unit.periods_of(history_frequency)` and dispersion by its square root.
    /// Daily or monthly history must declare its frequency, or a monthly run
    /// over daily data is scaled as if the data were weekly.
    pub fn with_unit(mut self, unit: SimulationUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_history_frequency(mut self, frequency: SimulationUnit) -> Self {
        self.history_frequency = frequency;
        self
    }

    pub fn with_max_lookback_days(mut self, days: u32) -> Self {
        self.max_lookback_days = days;
        self
    }

    /// Requested asset ids in ascending order.
    pub fn asset_ids(&self) -> Vec<AssetId> {
        let mut ids = self.allocations.iter().map(|a| a.id).collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Outcome of one simulated path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub final_value: f64,
    /// `final_value / initial_value - 1`.
    pub total_return: f64,
    /// Geometric annual rate implied by the path.
    pub annualized_return: f64,
    /// Portfolio value at every period boundary, starting with the initial value.
    pub path_values: Vec<f64>,
}
