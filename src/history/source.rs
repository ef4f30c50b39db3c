//! Storage seam for historical returns.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::core::{AssetId, BoxError};
use crate::history::ReturnObservation;

/// Supplies stored log-returns for a set of assets.
///
/// Implementations wrap whatever storage holds the history; errors are passed
/// through to the caller of [`crate::mc::run_simulation`] unchanged.
pub trait ReturnSource {
    /// Rows for `asset_ids` no older than `max_lookback_days` before each
    /// asset's most recent observation.
    fn fetch_returns(
        &self,
        asset_ids: &[AssetId],
        max_lookback_days: u32,
    ) -> Result<Vec<ReturnObservation>, BoxError>;
}

impl<S: ReturnSource + ?Sized> ReturnSource for &S {
    fn fetch_returns(
        &self,
        asset_ids: &[AssetId],
        max_lookback_days: u32,
    ) -> Result<Vec<ReturnObservation>, BoxError> {
        (**self).fetch_returns(asset_ids, max_lookback_days)
    }
}

/// Return history held in memory, mainly for tests and batch tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReturnSource {
    rows: Vec<ReturnObservation>,
}

impl InMemoryReturnSource {
    pub fn new(rows: Vec<ReturnObservation>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: ReturnObservation) {
        self.rows.push(row);
    }

    /// Appends one asset's returns on consecutive `dates`.
    pub fn insert_series(&mut self, asset_id: AssetId, dates: &[NaiveDate], returns: &[f64]) {
        self.rows.extend(
            dates
                .iter()
                .zip(returns.iter())
                .map(|(&d, &r)| ReturnObservation::new(asset_id, d, r)),
        );
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Extend<ReturnObservation> for InMemoryReturnSource {
    fn extend<I: IntoIterator<Item = ReturnObservation>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl FromIterator<ReturnObservation> for InMemoryReturnSource {
    fn from_iter<I: IntoIterator<Item = ReturnObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ReturnSource for InMemoryReturnSource {
    fn fetch_returns(
        &self,
        asset_ids: &[AssetId],
        max_lookback_days: u32,
    ) -> Result<Vec<ReturnObservation>, BoxError> {
        let mut newest: HashMap<AssetId, NaiveDate> = HashMap::new();
        for row in self.rows.iter().filter(|r| asset_ids.contains(&r.asset_id)) {
            newest
                .entry(row.asset_id)
                .and_modify(|d| *d = (*d).max(row.timestamp))
                .or_insert(row.timestamp);
        }

        let window = Days::new(u64::from(max_lookback_days));
        Ok(self
            .rows
            .iter()
            .filter(|r| {
                newest.get(&r.asset_id).is_some_and(|d| {
                    // A window reaching before the calendar's start keeps everything.
                    d.checked_sub_days(window)
                        .is_none_or(|start| r.timestamp >= start)
                })
            })
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn filters_by_asset_and_lookback() {
        let mut source = InMemoryReturnSource::default();
        source.insert_series(
            1,
            &[date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)],
            &[0.01, 0.02, 0.03],
        );
        source.insert_series(2, &[date(2024, 1, 8), date(2024, 1, 15)], &[0.04, 0.05]);
        source.push(ReturnObservation::new(3, date(2024, 1, 15), 0.06));

        let rows = source.fetch_returns(&[1, 2], 7).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.asset_id != 3));
        assert!(rows.iter().all(|r| r.timestamp >= date(2024, 1, 8)));

        let all = source.fetch_returns(&[1, 2, 3], 3_650).unwrap();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn lookback_is_relative_to_each_assets_newest_row() {
        let source: InMemoryReturnSource = [
            ReturnObservation::new(1, date(2020, 1, 1), 0.1),
            ReturnObservation::new(1, date(2020, 1, 2), 0.2),
            ReturnObservation::new(2, date(2024, 1, 1), 0.3),
        ]
        .into_iter()
        .collect();
        let rows = (&source).fetch_returns(&[1, 2], 1).unwrap();
        assert_eq!(rows.len(), 3);
        let rows = source.fetch_returns(&[1, 2], 0).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
