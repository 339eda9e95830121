use anyhow::Context;
use cdgdp_core::{CdGdpConfig, Pipeline};
use clap::Parser;
use std::fs;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, LogFormat};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(err) = run(&cli) {
        error!(error = ?err, "Run failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// Used when `RUST_LOG` is unset: progress from the cdgdp crates, warnings from dependencies.
const DEFAULT_LOG_FILTER: &str = "warn,cdgdp=info,cdgdp_core=info";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting census division GDP allocation");

    let config = CdGdpConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from '{}'", cli.config.display()))?
        .apply_env_overrides();
    let config = cli.apply_to(config);
    config.validate().context("validating configuration")?;

    let summary = Pipeline::new(config).run().context("allocating GDP to census divisions")?;
    info!(
        aggregates = summary.aggregates_loaded,
        divisions = summary.child_units_loaded,
        origin = %summary.unit_origin,
        rows = summary.rows_written,
        omitted_groups = summary.groups_omitted,
        rejected_groups = summary.groups_rejected,
        output = %summary.output_path.display(),
        "Done"
    );

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("writing run summary to '{}'", path.display()))?;
    }

    Ok(())
}
