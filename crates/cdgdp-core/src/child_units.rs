//! Child Unit Source: census profile first, boundary file as fallback.

use crate::boundary::BoundarySource;
use crate::census_profile::CensusProfileSource;
use crate::config::{CdGdpConfig, PathsConfig};
use crate::error::Result;
use cdgdp_types::ChildUnit;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Which strategy produced the child units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOrigin {
    CensusProfile,
    Boundary,
}

impl fmt::Display for UnitOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOrigin::CensusProfile => write!(f, "census profile"),
            UnitOrigin::Boundary => write!(f, "boundary file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedUnits {
    pub units: Vec<ChildUnit>,
    pub origin: UnitOrigin,
}

pub struct ChildUnitSource<'a> {
    profile: CensusProfileSource<'a>,
    boundary: BoundarySource<'a>,
}

impl<'a> ChildUnitSource<'a> {
    pub fn new(config: &'a CdGdpConfig) -> Self {
        Self {
            profile: CensusProfileSource::new(&config.census_profile, &config.provinces),
            boundary: BoundarySource::new(
                &config.boundary,
                &config.provinces,
                config.census_profile.default_weight,
            ),
        }
    }

    /// Tries the census profile and falls back to the boundary file when the profile
    /// is missing or yields no divisions. Errors from the boundary file are fatal.
    pub fn load(&self, paths: &PathsConfig) -> Result<LoadedUnits> {
        let units = match self.profile.load(&paths.census_profile_csv) {
            Ok(units) => units,
            Err(err) if err.is_not_found() => {
                warn!(error = %err, "Census profile not found");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        if !units.is_empty() {
            return Ok(LoadedUnits { units, origin: UnitOrigin::CensusProfile });
        }

        warn!(
            path = %paths.boundary_geojson.display(),
            "Census profile produced no divisions, trying boundary file"
        );
        let units = self.boundary.load(&paths.boundary_geojson)?;
        info!(divisions = units.len(), "Using divisions from boundary file");
        Ok(LoadedUnits { units, origin: UnitOrigin::Boundary })
    }
}
