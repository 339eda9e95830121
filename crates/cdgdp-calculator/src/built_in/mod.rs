//! Built-in calculators provided by cdgdp.

// Allocation calculators
pub mod proportional_allocator;
