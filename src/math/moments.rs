//! Sample moments over aligned return panels.
//!
//! Panels are laid out `returns[asset][t]`. Every estimator uses the `n - 1`
//! denominator so that `cov[i][i] == std_dev[i]^2` holds exactly up to
//! rounding.

use crate::core::StatisticsError;
use crate::math::numeric::Number;

/// Arithmetic mean; `NaN` for an empty slice.
pub fn sample_mean<T: Number>(values: &[T]) -> f64 {
    values.iter().map(|v| v.to_f64()).sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance; `NaN` with fewer than two observations.
pub fn sample_variance<T: Number>(values: &[T]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = sample_mean(values);
    let sum = values
        .iter()
        .map(|v| {
            let d = v.to_f64() - mean;
            d * d
        })
        .sum::<f64>();
    sum / (values.len() as f64 - 1.0)
}

pub fn sample_std_dev<T: Number>(values: &[T]) -> f64 {
    sample_variance(values).max(0.0).sqrt()
}

/// Pearson sample correlation of two equally long series.
pub fn sample_correlation<T: Number>(a: &[T], b: &[T]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let (ma, mb) = (sample_mean(&a[..n]), sample_mean(&b[..n]));
    let mut sab = 0.0;
    let mut saa = 0.0;
    let mut sbb = 0.0;
    for (x, y) in a.iter().zip(b.iter()).take(n) {
        let dx = x.to_f64() - ma;
        let dy = y.to_f64() - mb;
        sab += dx * dy;
        saa += dx * dx;
        sbb += dy * dy;
    }
    sab / (saa * sbb).sqrt()
}

/// Checks a panel is non-empty, rectangular, finite, with at least two rows.
pub fn validate_panel<T: Number>(returns: &[Vec<T>]) -> Result<(), StatisticsError> {
    let Some(first) = returns.first() else {
        return Err(StatisticsError::EmptyPanel);
    };
    let n_obs = first.len();
    if n_obs < 2 {
        return Err(StatisticsError::InsufficientHistory {
            required: 2,
            available: n_obs,
        });
    }
    for (asset, row) in returns.iter().enumerate() {
        if row.len() != n_obs {
            return Err(StatisticsError::RaggedPanel {
                asset,
                expected: n_obs,
                actual: row.len(),
            });
        }
        if row.iter().any(|x| !x.to_f64().is_finite()) {
            return Err(StatisticsError::NonFiniteReturn { asset });
        }
    }
    Ok(())
}

/// Sample covariance matrix of a validated panel.
pub fn sample_covariance_matrix<T: Number>(
    returns: &[Vec<T>],
) -> Result<Vec<Vec<f64>>, StatisticsError> {
    validate_panel(returns)?;

    let n_assets = returns.len();
    let n_obs = returns[0].len();
    let centered = returns
        .iter()
        .map(|row| {
            let mean = sample_mean(row);
            row.iter().map(|v| v.to_f64() - mean).collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let denom = (n_obs - 1) as f64;
    let mut cov = vec![vec![0.0; n_assets]; n_assets];
    for i in 0..n_assets {
        for j in i..n_assets {
            let v = centered[i]
                .iter()
                .zip(centered[j].iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / denom;
            cov[i][j] = v;
            cov[j][i] = v;
        }
    }
    Ok(cov)
}
