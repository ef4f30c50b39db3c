//! Cholesky factorization and covariance/correlation utilities.
//!
//! Matrices are dense row-major `Vec<Vec<f64>>`, the layout every caller in
//! the crate already holds. `nalgebra` is only used for the eigenvalue
//! diagnostics that accompany a failed factorization.
//!
//! References:
//! - Golub and Van Loan, *Matrix Computations* (4th ed.), Sec. 4.2.
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, Sec. 2.3.

use nalgebra::{DMatrix, SymmetricEigen};

/// Relative pivot threshold below which a matrix is treated as singular.
pub const PIVOT_TOLERANCE: f64 = 1.0e-12;

/// Strict Cholesky factorization `A = L L^T`.
///
/// Returns `None` when `matrix` is not square, not finite, or not positive
/// definite: a pivot at or below `PIVOT_TOLERANCE * max(diag)` fails.
pub fn cholesky_lower(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }
    if matrix.iter().flatten().any(|x| !x.is_finite()) {
        return None;
    }

    let scale = (0..n).map(|i| matrix[i][i].abs()).fold(0.0_f64, f64::max);
    let threshold = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);
    let mut l = vec![vec![0.0_f64; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for (&lik, &ljk) in l[i].iter().zip(l[j].iter()).take(j) {
                sum -= lik * ljk;
            }

            if i == j {
                if sum <= threshold {
                    return None;
                }
                l[i][i] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Computes `out = L * z` for a lower-triangular `L`.
#[inline]
pub fn lower_mul_vec(lower: &[Vec<f64>], z: &[f64], out: &mut [f64]) {
    for (i, (row, out_i)) in lower.iter().zip(out.iter_mut()).enumerate() {
        let mut sum = 0.0;
        for (lij, zj) in row.iter().zip(z.iter()).take(i + 1) {
            sum += lij * zj;
        }
        *out_i = sum;
    }
}

/// Rebuilds `L L^T` from a lower-triangular factor.
pub fn reconstruct_from_lower(lower: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = lower.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let v = lower[i]
                .iter()
                .zip(lower[j].iter())
                .take(j + 1)
                .map(|(a, b)| a * b)
                .sum::<f64>();
            out[i][j] = v;
            out[j][i] = v;
        }
    }
    out
}

/// Derives `corr[i][j] = cov[i][j] / (sigma[i] * sigma[j])`.
///
/// The diagonal is pinned to exactly one. A zero `sigma` yields a non-finite
/// row, which the subsequent factorization rejects.
pub fn covariance_to_correlation(cov: &[Vec<f64>], sigma: &[f64]) -> Vec<Vec<f64>> {
    let n = sigma.len();
    let mut corr = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..i {
            let rho = cov[i][j] / (sigma[i] * sigma[j]);
            corr[i][j] = rho;
            corr[j][i] = rho;
        }
        corr[i][i] = if sigma[i] > 0.0 { 1.0 } else { f64::NAN };
    }
    corr
}

/// Minimum eigenvalue of a symmetric matrix, `None` for malformed input.
pub fn min_eigenvalue_symmetric(matrix: &[Vec<f64>]) -> Option<f64> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }
    if matrix.iter().flatten().any(|x| !x.is_finite()) {
        return None;
    }

    let data = matrix
        .iter()
        .flat_map(|row| row.iter().copied())
        .collect::<Vec<_>>();
    let eig = SymmetricEigen::new(DMatrix::from_row_slice(n, n, &data));
    eig.eigenvalues.iter().copied().reduce(f64::min)
}
