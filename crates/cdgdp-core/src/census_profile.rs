//! Census profile reader (primary Child Unit strategy)
//!
//! The profile holds one row per (geography, characteristic). Only rows at the census
//! division level are kept; the first row of each division fixes its position in the
//! output, and the configured population characteristic, when present, supplies its
//! weight. Files are ISO-8859-1 encoded.

use crate::config::{CensusProfileConfig, ProvinceTable};
use crate::error::{CdGdpError, Result};
use crate::parse::{decode_latin1, parse_amount, strip_bom};
use cdgdp_types::ChildUnit;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Column positions resolved from the header row
struct Columns {
    geo_level: usize,
    uid: usize,
    characteristic: Option<usize>,
    count: Option<usize>,
}

pub struct CensusProfileSource<'a> {
    config: &'a CensusProfileConfig,
    provinces: &'a ProvinceTable,
}

impl<'a> CensusProfileSource<'a> {
    pub fn new(config: &'a CensusProfileConfig, provinces: &'a ProvinceTable) -> Self {
        Self { config, provinces }
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Vec<ChildUnit>> {
        let file = File::open(path).map_err(|err| CdGdpError::io(path, &err))?;
        self.load_from_reader(file, path)
    }

    pub fn load_from_reader<R: Read>(&self, reader: R, origin: &Path) -> Result<Vec<ChildUnit>> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|err| CdGdpError::csv(origin, &err))?
            .iter()
            .map(|field| decode_latin1(strip_bom(field)).trim().to_string())
            .collect();

        let Some(columns) = self.resolve_columns(&headers) else {
            warn!(
                geo_level_column = %self.config.geo_level_column,
                uid_column = %self.config.uid_column,
                "Census profile lacks required columns"
            );
            return Ok(Vec::new());
        };
        if columns.characteristic.is_none() || columns.count.is_none() {
            warn!("Census profile has no population columns; every division gets the default weight");
        }

        let mut units: Vec<ChildUnit> = Vec::new();
        let mut slots: HashMap<(String, String), usize> = HashMap::new();
        let mut weighted: Vec<bool> = Vec::new();
        let mut other_levels = 0usize;
        let mut skipped = 0usize;

        for result in reader.byte_records() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(CdGdpError::csv(origin, &err)),
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };
            let field = |index: usize| decode_latin1(record.get(index).unwrap_or_default());
            let line = record.position().map(|p| p.line());

            if field(columns.geo_level).trim() != self.config.geo_level_value {
                other_levels += 1;
                continue;
            }

            let uid = field(columns.uid).trim().to_string();
            let Some(parent_id) = uid.get(..2).filter(|code| self.provinces.contains_code(code)) else {
                debug!(?line, uid = %uid, "Skipping division without a known province prefix");
                skipped += 1;
                continue;
            };
            let parent_id = parent_id.to_string();

            let key = (uid, parent_id);
            let slot = match slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let (child_id, parent_id) = key.clone();
                    units.push(ChildUnit::new(child_id, parent_id, self.config.default_weight));
                    weighted.push(false);
                    slots.insert(key, units.len() - 1);
                    units.len() - 1
                }
            };

            if weighted[slot] {
                continue;
            }
            let (Some(characteristic), Some(count)) = (columns.characteristic, columns.count) else {
                continue;
            };
            if !field(characteristic).trim().eq_ignore_ascii_case(&self.config.population_characteristic) {
                continue;
            }

            weighted[slot] = true;
            match parse_amount(&field(count)) {
                Some(population) if population >= 0.0 => units[slot].weight = population,
                _ => debug!(
                    ?line,
                    child_id = %units[slot].child_id,
                    "Unusable population count; keeping default weight"
                ),
            }
        }

        let with_population = weighted.iter().filter(|w| **w).count();
        info!(
            divisions = units.len(),
            with_population,
            other_level_rows = other_levels,
            skipped_rows = skipped,
            "Loaded census divisions from profile"
        );
        Ok(units)
    }

    fn resolve_columns(&self, headers: &[String]) -> Option<Columns> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Some(Columns {
            geo_level: position(&self.config.geo_level_column)?,
            uid: position(&self.config.uid_column)?,
            characteristic: position(&self.config.characteristic_column),
            count: position(&self.config.count_column),
        })
    }
}
