//! Historical return rows, the storage seam that supplies them, and the
//! aggregation step that turns them into aligned per-asset series.

pub mod aggregate;
pub mod source;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{AssetAllocation, AssetId};

pub use aggregate::{aggregate_returns, returns_panel, verify_alignment, weight_vector};
pub use source::{InMemoryReturnSource, ReturnSource};

/// One stored log-return of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    pub asset_id: AssetId,
    pub timestamp: NaiveDate,
    pub log_return: f64,
}

impl ReturnObservation {
    pub fn new(asset_id: AssetId, timestamp: NaiveDate, log_return: f64) -> Self {
        Self {
            asset_id,
            timestamp,
            log_return,
        }
    }
}

/// Returns of one requested asset, in the order the source produced them.
///
/// `returns` and `dates` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReturns {
    pub asset_id: AssetId,
    pub ticker: String,
    pub weight: f64,
    pub returns: Vec<f64>,
    pub dates: Vec<NaiveDate>,
}

impl SeriesReturns {
    pub fn new(allocation: &AssetAllocation) -> Self {
        Self {
            asset_id: allocation.id,
            ticker: allocation.ticker.clone(),
            weight: allocation.weight,
            returns: Vec::new(),
            dates: Vec::new(),
        }
    }

    pub fn push(&mut self, timestamp: NaiveDate, log_return: f64) {
        self.dates.push(timestamp);
        self.returns.push(log_return);
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Earliest and latest date regardless of row order.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.dates.iter().min()?;
        let last = self.dates.iter().max()?;
        Some((*first, *last))
    }
}
