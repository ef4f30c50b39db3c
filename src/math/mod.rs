//! Numerical building blocks: generic scalar helpers, normal distribution
//! approximations, seeded generators, Cholesky utilities and sample moments.

pub mod correlation;
pub mod fast_norm;
pub mod fast_rng;
pub mod moments;
pub mod numeric;

pub use correlation::{
    cholesky_lower, covariance_to_correlation, lower_mul_vec, min_eigenvalue_symmetric,
    reconstruct_from_lower,
};
pub use fast_norm::{clamp_probability, norm_cdf, norm_inv_cdf, norm_pdf};
pub use fast_rng::{FastRng, FastRngKind, stream_seed};
pub use moments::{
    sample_correlation, sample_covariance_matrix, sample_mean, sample_std_dev, sample_variance,
};
pub use numeric::{Number, dot_product};
