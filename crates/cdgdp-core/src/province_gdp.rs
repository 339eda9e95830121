//! Province Aggregate Source
//!
//! Reads the province-level GDP table and keeps one value per province for the
//! configured reference period. Rows for other periods, unknown province names and
//! unparseable values are skipped.

use crate::config::{ProvinceGdpConfig, ProvinceTable};
use crate::error::{CdGdpError, Result};
use crate::parse::{parse_amount, strip_bom};
use cdgdp_types::ParentAggregates;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

pub struct ProvinceGdpSource<'a> {
    config: &'a ProvinceGdpConfig,
    provinces: &'a ProvinceTable,
}

impl<'a> ProvinceGdpSource<'a> {
    pub fn new(config: &'a ProvinceGdpConfig, provinces: &'a ProvinceTable) -> Self {
        Self { config, provinces }
    }

    /// Loads aggregates from the CSV file at `path`. A missing or empty file is an error.
    #[instrument(skip(self, path), fields(path = %path.display(), period = %self.config.period))]
    pub fn load(&self, path: &Path) -> Result<ParentAggregates> {
        let file = File::open(path).map_err(|err| CdGdpError::io(path, &err))?;
        self.load_from_reader(file, path)
    }

    /// Loads aggregates from any reader; `origin` names the input in errors.
    pub fn load_from_reader<R: Read>(&self, reader: R, origin: &Path) -> Result<ParentAggregates> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.byte_headers().map_err(|err| CdGdpError::csv(origin, &err))?;
        if headers.is_empty() {
            return Err(CdGdpError::empty_input(origin));
        }

        let mut aggregates = ParentAggregates::new();
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
            let line = record.position().map(|p| p.line());

            match self.parse_row(&record) {
                Ok((code, value)) => {
                    if aggregates.contains(code) {
                        debug!(?line, province = code, "Later row overrides earlier value");
                    }
                    aggregates.insert(code, value);
                }
                Err(reason) => {
                    debug!(?line, reason, "Skipping row");
                    skipped += 1;
                }
            }
        }

        info!(
            provinces = aggregates.len(),
            skipped_rows = skipped,
            "Loaded provincial aggregates"
        );
        Ok(aggregates)
    }

    fn parse_row(&self, record: &csv::ByteRecord) -> std::result::Result<(&'static str, f64), &'static str> {
        if record.len() < self.config.min_columns {
            return Err("too few columns");
        }

        let field = move |index: usize| {
            String::from_utf8_lossy(strip_bom(record.get(index).unwrap_or_default()))
        };

        if field(self.config.period_column).trim() != self.config.period {
            return Err("other period");
        }
        let code = self
            .provinces
            .code_for_name(&field(self.config.name_column))
            .ok_or("unrecognised province name")?;
        let value = parse_amount(&field(self.config.value_column)).ok_or("missing or unparseable value")?;

        Ok((code, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> Result<ParentAggregates> {
        let config = ProvinceGdpConfig::default();
        let provinces = ProvinceTable::default();
        ProvinceGdpSource::new(&config, &provinces).load_from_reader(csv.as_bytes(), Path::new("gdp.csv"))
    }

    fn row(year: &str, name: &str, value: &str) -> String {
        let mut fields = vec![year.to_string(), name.to_string()];
        fields.extend((2..11).map(|i| format!("c{i}")));
        fields.push(value.to_string());
        fields.join(",")
    }

    const HEADER: &str = "year,province,c2,c3,c4,c5,c6,c7,c8,c9,c10,gdp\n";

    #[test]
    fn keeps_rows_for_the_period() {
        let csv = format!(
            "{HEADER}{}\n{}\n{}\n",
            row("2021", "Ontario", "\"1,000,000.5\""),
            row("2020", "Ontario", "5"),
            row("2021", "Quebec", "\"$450,000\""),
        );
        let aggregates = load(&csv).unwrap();

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates.get("35"), Some(1_000_000.5));
        assert_eq!(aggregates.get("24"), Some(450_000.0));
    }

    #[test]
    fn skips_malformed_rows() {
        let csv = format!(
            "{HEADER}2021,Ontario,short\n{}\n{}\n{}\n",
            row("2021", "Canada", "10"),
            row("2021", "Alberta", ""),
            row("2021", "Yukon", "n/a"),
        );
        let aggregates = load(&csv).unwrap();
        assert!(aggregates.is_empty());
    }

    #[test]
    fn later_rows_override() {
        let csv = format!("{HEADER}{}\n{}\n", row("2021", "Nunavut", "1"), row("2021", "Nunavut", "2"));
        assert_eq!(load(&csv).unwrap().get("62"), Some(2.0));
    }

    #[test]
    fn tolerates_byte_order_mark() {
        let csv = format!("\u{feff}{HEADER}{}\n", row("\u{feff}2021", "Manitoba", "7"));
        assert_eq!(load(&csv).unwrap().get("46"), Some(7.0));
    }

    #[test]
    fn empty_input_is_fatal() {
        let err = load("").unwrap_err();
        assert_eq!(err.category(), "empty_input");
    }

    #[test]
    fn missing_file_is_fatal() {
        let config = ProvinceGdpConfig::default();
        let provinces = ProvinceTable::default();
        let err = ProvinceGdpSource::new(&config, &provinces)
            .load(Path::new("no/such/gdp.csv"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
