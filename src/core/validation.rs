//! Structural checks on a [`SimulationRequest`], run before any I/O.

use std::collections::HashSet;

use crate::core::error::ValidationError;
use crate::core::types::SimulationRequest;

/// Allowed distance of the weight sum from one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1.0e-6;

/// Validates a request.
///
/// Checks run in a fixed order and the first failure is returned: weight sum,
/// duplicate asset ids, iteration count, duration, then the Student-t degrees
/// of freedom.
pub fn validate(request: &SimulationRequest) -> Result<(), ValidationError> {
    let sum = request.allocations.iter().map(|a| a.weight).sum::<f64>();
    // Negated so that a NaN sum is rejected as well.
    if !((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE) {
        return Err(ValidationError::WeightSum { sum });
    }

    let mut seen = HashSet::with_capacity(request.allocations.len());
    for allocation in &request.allocations {
        if !seen.insert(allocation.id) {
            return Err(ValidationError::DuplicateAsset {
                asset_id: allocation.id,
            });
        }
    }

    if request.iterations == 0 {
        return Err(ValidationError::ZeroIterations);
    }
    if request.duration == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    if let Some(value) = request.distribution.degrees_of_freedom()
        && !(value.is_finite() && value > 0.0)
    {
        return Err(ValidationError::InvalidDegreesOfFreedom { value });
    }

    Ok(())
}

impl SimulationRequest {
    /// See [`validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}
