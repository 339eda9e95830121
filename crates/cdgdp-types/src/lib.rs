//! cdgdp Types
//!
//! This crate defines the data model shared across the cdgdp workspace
//! (`cdgdp-calculator`, `cdgdp-core` and the CLI). Keeping the types here lets the
//! allocator stay free of any I/O dependency.

#![deny(warnings)]
#![deny(missing_docs)]

mod province;
mod types;

pub use province::{Province, UnknownProvince};
pub use types::{AllocationResult, ChildUnit, ParentAggregates};
