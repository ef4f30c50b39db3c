//! Grouping of raw return rows into per-asset series plus the alignment check
//! that must pass before any statistics are computed.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::core::{AlignmentError, AssetAllocation, AssetId};
use crate::history::{ReturnObservation, SeriesReturns};

/// Groups `rows` by asset and verifies the resulting series are aligned.
///
/// Output holds one series per allocation, ordered by ascending asset id.
/// Within a series rows keep the order in which they were encountered. Rows
/// for assets that were not requested are skipped.
pub fn aggregate_returns(
    allocations: &[AssetAllocation],
    rows: &[ReturnObservation],
) -> Result<Vec<SeriesReturns>, AlignmentError> {
    let mut grouped = allocations
        .iter()
        .map(|a| (a.id, SeriesReturns::new(a)))
        .collect::<BTreeMap<AssetId, SeriesReturns>>();

    let mut ignored = 0_usize;
    for row in rows {
        match grouped.get_mut(&row.asset_id) {
            Some(series) => series.push(row.timestamp, row.log_return),
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        warn!(ignored, "skipping return rows for unrequested assets");
    }

    let series = grouped.into_values().collect::<Vec<_>>();
    verify_alignment(&series)?;
    debug!(
        assets = series.len(),
        observations = series.first().map_or(0, SeriesReturns::len),
        "aggregated return series"
    );
    Ok(series)
}

/// Checks that every series covers the same first date, last date and count.
///
/// Each series is compared against the first one; the first disagreement is
/// reported with the offending asset.
pub fn verify_alignment(series: &[SeriesReturns]) -> Result<(), AlignmentError> {
    let Some(reference) = series.first() else {
        return Err(AlignmentError::Empty);
    };
    let (first, last) = reference
        .date_range()
        .ok_or(AlignmentError::MissingHistory {
            asset_id: reference.asset_id,
        })?;
    let length = reference.len();

    for s in &series[1..] {
        let (s_first, s_last) = s.date_range().ok_or(AlignmentError::MissingHistory {
            asset_id: s.asset_id,
        })?;
        if s_first != first {
            return Err(AlignmentError::FirstDate {
                asset_id: s.asset_id,
                expected: first,
                actual: s_first,
            });
        }
        if s_last != last {
            return Err(AlignmentError::LastDate {
                asset_id: s.asset_id,
                expected: last,
                actual: s_last,
            });
        }
        if s.len() != length {
            return Err(AlignmentError::Length {
                asset_id: s.asset_id,
                expected: length,
                actual: s.len(),
            });
        }
    }
    Ok(())
}

/// Returns laid out `panel[asset][t]`, in series order.
pub fn returns_panel(series: &[SeriesReturns]) -> Vec<Vec<f64>> {
    series.iter().map(|s| s.returns.clone()).collect()
}

/// Weights in series order, matching [`returns_panel`].
pub fn weight_vector(series: &[SeriesReturns]) -> Vec<f64> {
    series.iter().map(|s| s.weight).collect()
}
