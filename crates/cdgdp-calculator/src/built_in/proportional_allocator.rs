//! Proportional Allocator Calculator
//!
//! Distributes `total_amount` proportionally based on an `individual_value`
//! relative to a `total_value`.
//!
//! result = total_amount * (individual_value / total_value)
//!
//! The share is computed first so that a child holding the whole weight receives
//! exactly `total_amount`.

use crate::calculator::{CalculationResult, Calculator};
use crate::error::AllocationError;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProportionalAllocatorCalculator;

impl Calculator for ProportionalAllocatorCalculator {
    fn name(&self) -> &str {
        "proportional_allocator"
    }

    fn calculate(
        &self,
        total_amount: f64,
        individual_value: f64,
        total_value: f64,
    ) -> CalculationResult {
        if !total_value.is_finite() || total_value <= 0.0 {
            return Err(AllocationError::InvalidTotalValue { total_value });
        }

        let share = individual_value / total_value;
        let allocation = total_amount * share;
        if !allocation.is_finite() {
            return Err(AllocationError::NonFiniteResult { individual_value, total_value });
        }
        Ok(allocation)
    }
}
