#![deny(warnings)]
//! The allocation core of cdgdp.
//!
//! This crate provides the [`Calculator`] trait, the built-in proportional calculator
//! and the [`Allocator`], which splits each parent aggregate across its child units in
//! proportion to their weights. It performs no I/O and keeps no state between calls.

pub mod allocator;
pub mod built_in;
pub mod calculator;
pub mod error;

pub use allocator::{AllocationReport, Allocator, Omission, OmissionReason, allocate};
pub use built_in::proportional_allocator::ProportionalAllocatorCalculator;
pub use calculator::{CalculationResult, Calculator};
pub use error::AllocationError;
