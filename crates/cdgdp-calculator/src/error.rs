use thiserror::Error;

/// Reasons a parent group is rejected as structurally invalid.
///
/// A rejection is always scoped to one parent group; the rest of the batch is
/// still allocated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("aggregate value {value} is not a finite number")]
    NonFiniteAggregate { value: f64 },

    #[error("child '{child_id}' has invalid weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { child_id: String, weight: f64 },

    #[error("total group weight overflowed to {total_weight}")]
    NonFiniteTotalWeight { total_weight: f64 },

    #[error("total value {total_value} must be finite and greater than zero")]
    InvalidTotalValue { total_value: f64 },

    #[error("allocating {individual_value} of {total_value} produced a non-finite value")]
    NonFiniteResult { individual_value: f64, total_value: f64 },
}
