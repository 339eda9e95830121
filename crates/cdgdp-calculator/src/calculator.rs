use crate::error::AllocationError;

pub type CalculationResult = Result<f64, AllocationError>;

/// Computes the value a single child receives from its parent aggregate.
/// Calculators are stateless and thread-safe.
pub trait Calculator: Send + Sync {
    /// The name of the calculator.
    fn name(&self) -> &str;

    /// Value for one child carrying `individual_value` out of `total_value`, given the
    /// parent's `total_amount`.
    fn calculate(
        &self,
        total_amount: f64,
        individual_value: f64,
        total_value: f64,
    ) -> CalculationResult;
}
