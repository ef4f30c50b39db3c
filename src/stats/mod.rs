//! Statistics Builder.
//!
//! Turns an aligned return panel into the immutable [`StatisticalResources`]
//! every simulation worker reads from: mean and dispersion vectors, the
//! covariance matrix and its Cholesky factor, and for Student-t runs the
//! correlation matrix, its factor and the marginal distribution.
//!
//! References:
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, Sec. 2.3.3.
//! - Cherubini, Luciano and Vecchiato (2004), *Copula Methods in Finance*, Ch. 5.

mod resources;

pub use resources::{GaussianCopula, StatisticalResources, build_statistical_resources};
