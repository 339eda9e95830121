#![deny(warnings)]
#![allow(missing_docs)]
//! Input sources, output sink and run pipeline for census division GDP allocation.
//!
//! The sources turn Statistics Canada tables into the shared data model, the
//! allocator in `cdgdp-calculator` splits provincial GDP across census divisions, and
//! the output writer serialises the result for joining to a boundary dataset.

/// Boundary file reader used as the fallback division source
pub mod boundary;
/// Census profile reader, the primary division source
pub mod census_profile;
/// Ordered fallback between the division sources
pub mod child_units;
/// Run configuration
pub mod config;
/// Error types for file-level failures
pub mod error;
/// CSV writer for allocated rows
pub mod output;
/// Lenient numeric and text decoding
pub mod parse;
/// End-to-end orchestration
pub mod pipeline;
/// Province-level GDP reader
pub mod province_gdp;

pub use child_units::{ChildUnitSource, LoadedUnits, UnitOrigin};
pub use config::{CdGdpConfig, ProvinceTable};
pub use error::{CdGdpError, Result};
pub use output::OutputWriter;
pub use pipeline::{Pipeline, RunSummary};
pub use province_gdp::ProvinceGdpSource;
