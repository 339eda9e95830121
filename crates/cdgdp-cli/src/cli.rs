//! Command-line arguments for the `cdgdp` binary.

use cdgdp_core::CdGdpConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Allocate provincial GDP down to census divisions in proportion to population
#[derive(Debug, Parser)]
#[command(name = "cdgdp")]
#[command(about = "Allocate provincial GDP down to census divisions", version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "cdgdp.toml")]
    pub config: PathBuf,

    /// Province-level GDP table
    #[arg(long)]
    pub province_gdp: Option<PathBuf>,

    /// Census profile at the census division level
    #[arg(long)]
    pub census_profile: Option<PathBuf>,

    /// Census division boundary file, used when the profile yields nothing
    #[arg(long)]
    pub boundary: Option<PathBuf>,

    /// Output CSV, rewritten on every run
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reference period to select from the GDP table
    #[arg(long)]
    pub period: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl Cli {
    /// Applies flag overrides on top of a loaded configuration.
    pub fn apply_to(&self, mut config: CdGdpConfig) -> CdGdpConfig {
        if let Some(path) = &self.province_gdp {
            config.paths.province_gdp_csv = path.clone();
        }
        if let Some(path) = &self.census_profile {
            config.paths.census_profile_csv = path.clone();
        }
        if let Some(path) = &self.boundary {
            config.paths.boundary_geojson = path.clone();
        }
        if let Some(path) = &self.output {
            config.paths.output_csv = path.clone();
        }
        if let Some(period) = &self.period {
            config.province_gdp.period = period.clone();
        }
        config
    }
}
