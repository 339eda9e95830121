//! Output sink: one CSV row per allocated census division.

use crate::config::{OutputConfig, ProvinceTable};
use crate::error::{CdGdpError, Result};
use cdgdp_types::AllocationResult;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Formats an allocated value with a fixed number of decimals.
pub fn format_value(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Formats a weight, dropping the fractional part when it is integral.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < 1e15 {
        format!("{weight:.0}")
    } else {
        weight.to_string()
    }
}

pub struct OutputWriter<'a> {
    config: &'a OutputConfig,
    provinces: &'a ProvinceTable,
}

impl<'a> OutputWriter<'a> {
    pub fn new(config: &'a OutputConfig, provinces: &'a ProvinceTable) -> Self {
        Self { config, provinces }
    }

    /// Rewrites the file at `path`, creating parent directories as needed.
    #[instrument(skip(self, path, results), fields(path = %path.display(), rows = results.len()))]
    pub fn write(&self, path: &Path, results: &[AllocationResult]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| CdGdpError::io(parent, &err))?;
        }
        let file = fs::File::create(path).map_err(|err| CdGdpError::io(path, &err))?;
        self.write_to(file, results).map_err(|err| match err {
            CdGdpError::Csv { message, line, .. } => {
                CdGdpError::Csv { message, path: Some(path.display().to_string()), line }
            }
            CdGdpError::Io { message, kind, .. } => {
                CdGdpError::Io { message, path: path.display().to_string(), kind }
            }
            other => other,
        })?;
        info!("Wrote census division output");
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W, results: &[AllocationResult]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record([
            "cd_uid",
            "province_code",
            "province_name",
            self.config.weight_header.as_str(),
            self.config.value_header.as_str(),
        ])?;

        for row in results {
            let name = self.provinces.name_for_code(&row.parent_id).unwrap_or(row.parent_id.as_str());
            let weight = format_weight(row.weight);
            let value = format_value(row.allocated_value, self.config.decimals);
            writer.write_record([
                row.child_id.as_str(),
                row.parent_id.as_str(),
                name,
                weight.as_str(),
                value.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(results: &[AllocationResult]) -> String {
        let config = OutputConfig::default();
        let provinces = ProvinceTable::default();
        let mut buffer = Vec::new();
        OutputWriter::new(&config, &provinces).write_to(&mut buffer, results).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn result(child: &str, parent: &str, weight: f64, value: f64) -> AllocationResult {
        AllocationResult {
            child_id: child.to_string(),
            parent_id: parent.to_string(),
            weight,
            allocated_value: value,
        }
    }

    #[test]
    fn writes_fixed_column_order() {
        let csv = render(&[
            result("3520", "35", 2_794_356.0, 450_000.0),
            result("2466", "24", 1.0, 1.0 / 3.0),
        ]);

        assert_eq!(
            csv,
            "cd_uid,province_code,province_name,population_2021,gdp_2021_millions\n\
             3520,35,Ontario,2794356,450000.000\n\
             2466,24,Quebec,1,0.333\n"
        );
    }

    #[test]
    fn unknown_parent_uses_code_as_name() {
        let csv = render(&[result("A", "X1", 2.5, 10.0)]);
        assert!(csv.ends_with("A,X1,X1,2.5,10.000\n"));
    }

    #[test]
    fn empty_results_still_write_header() {
        assert_eq!(
            render(&[]),
            "cd_uid,province_code,province_name,population_2021,gdp_2021_millions\n"
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn flush_failure_is_an_io_error() {
        let config = OutputConfig::default();
        let provinces = ProvinceTable::default();
        let err = OutputWriter::new(&config, &provinces).write_to(FailingWriter, &[]).unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn formats_values_and_weights() {
        assert_eq!(format_value(225_000.0, 3), "225000.000");
        assert_eq!(format_value(0.0006, 3), "0.001");
        assert_eq!(format_value(12.3456, 1), "12.3");
        assert_eq!(format_weight(1.0), "1");
        assert_eq!(format_weight(0.0), "0");
        assert_eq!(format_weight(1234.5), "1234.5");
    }
}
