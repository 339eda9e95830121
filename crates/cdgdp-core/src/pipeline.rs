//! End-to-end run: load aggregates and divisions, allocate, write the output.

use crate::child_units::{ChildUnitSource, UnitOrigin};
use crate::config::CdGdpConfig;
use crate::error::Result;
use crate::output::OutputWriter;
use crate::province_gdp::ProvinceGdpSource;
use cdgdp_calculator::{AllocationReport, Allocator, Calculator, OmissionReason};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Counts reported at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub aggregates_loaded: usize,
    pub child_units_loaded: usize,
    pub unit_origin: UnitOrigin,
    pub rows_written: usize,
    pub groups_omitted: usize,
    pub groups_rejected: usize,
    pub duplicates_dropped: usize,
    pub output_path: PathBuf,
}

pub struct Pipeline {
    config: CdGdpConfig,
    allocator: Allocator,
}

impl Pipeline {
    pub fn new(config: CdGdpConfig) -> Self {
        Self { config, allocator: Allocator::new() }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let config = &self.config;
        let paths = &config.paths;

        info!(path = %paths.province_gdp_csv.display(), "Loading provincial GDP");
        let aggregates = ProvinceGdpSource::new(&config.province_gdp, &config.provinces)
            .load(&paths.province_gdp_csv)?;
        info!(
            count = aggregates.len(),
            known = aggregates.known_len(),
            "Loaded GDP for provinces and territories"
        );

        info!("Loading census division data");
        let loaded = ChildUnitSource::new(config).load(paths)?;
        info!(count = loaded.units.len(), origin = %loaded.origin, "Loaded census divisions");
        if loaded.units.is_empty() {
            warn!("No census divisions were found; the output will only contain a header");
        }

        info!(calculator = self.allocator.calculator().name(), "Allocating GDP down to census divisions");
        let report = self.allocator.allocate_with_report(&aggregates, &loaded.units);
        log_omissions(&report);
        info!(rows = report.results.len(), "Produced census division GDP rows");

        OutputWriter::new(&config.output, &config.provinces).write(&paths.output_csv, &report.results)?;
        info!(path = %paths.output_csv.display(), "Wrote census division GDP");

        Ok(RunSummary {
            aggregates_loaded: aggregates.len(),
            child_units_loaded: loaded.units.len(),
            unit_origin: loaded.origin,
            rows_written: report.results.len(),
            groups_omitted: report.omissions.len(),
            groups_rejected: report.rejections().count(),
            duplicates_dropped: report.duplicates_dropped,
            output_path: paths.output_csv.clone(),
        })
    }
}

fn log_omissions(report: &AllocationReport) {
    for omission in &report.omissions {
        match &omission.reason {
            OmissionReason::Rejected(err) => warn!(
                parent_id = %omission.parent_id,
                children = omission.child_count,
                error = %err,
                "Rejected parent group"
            ),
            reason => debug!(
                parent_id = %omission.parent_id,
                children = omission.child_count,
                %reason,
                "Omitted parent group"
            ),
        }
    }
    if report.duplicates_dropped > 0 {
        debug!(duplicates = report.duplicates_dropped, "Dropped duplicate census divisions");
    }
}
