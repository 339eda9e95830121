//! Error handling for the cdgdp input and output layer
//!
//! Only file-level problems surface here. Malformed rows are skipped by the sources
//! and groups that cannot be allocated are reported by the allocator, so neither
//! ever becomes a `CdGdpError`.

use std::path::Path;
use thiserror::Error;

/// Error type for loading inputs, writing output and configuration
#[derive(Error, Debug)]
pub enum CdGdpError {
    /// File system errors
    #[error("I/O error on '{path}': {message}")]
    Io { message: String, path: String, kind: std::io::ErrorKind },

    /// CSV reading and writing errors
    #[error("CSV error: {message}")]
    Csv { message: String, path: Option<String>, line: Option<u64> },

    /// Boundary file parsing errors
    #[error("GeoJSON error: {message}")]
    GeoJson { message: String, path: Option<String> },

    /// Configuration loading and validation errors
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// A required input exists but holds no header row
    #[error("Input '{path}' is empty")]
    EmptyInput { path: String },
}

impl CdGdpError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CdGdpError::Io { .. } => "io",
            CdGdpError::Csv { .. } => "csv",
            CdGdpError::GeoJson { .. } => "geojson",
            CdGdpError::Configuration { .. } => "configuration",
            CdGdpError::EmptyInput { .. } => "empty_input",
        }
    }

    /// Whether the underlying cause is a file that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CdGdpError::Io { kind: std::io::ErrorKind::NotFound, .. })
    }
}

/// Result type alias for input/output operations
pub type Result<T> = std::result::Result<T, CdGdpError>;

/// Convenience constructors for common error scenarios
impl CdGdpError {
    /// Create an I/O error for `path`
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io { message: err.to_string(), path: path.display().to_string(), kind: err.kind() }
    }

    /// Create a CSV error for `path`
    pub fn csv(path: &Path, err: &csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
            path: Some(path.display().to_string()),
            line: err.position().map(|p| p.line()),
        }
    }

    /// Create a GeoJSON error for `path`
    pub fn geojson(path: &Path, message: impl Into<String>) -> Self {
        Self::GeoJson { message: message.into(), path: Some(path.display().to_string()) }
    }

    /// Create a configuration error about `setting`
    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into(), setting: Some(setting.to_string()) }
    }

    /// Create an empty input error
    pub fn empty_input(path: &Path) -> Self {
        Self::EmptyInput { path: path.display().to_string() }
    }
}

impl From<std::io::Error> for CdGdpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io { message: err.to_string(), path: String::from("<unknown>"), kind: err.kind() }
    }
}

impl From<csv::Error> for CdGdpError {
    fn from(err: csv::Error) -> Self {
        Self::Csv { message: err.to_string(), path: None, line: err.position().map(|p| p.line()) }
    }
}

impl From<serde_json::Error> for CdGdpError {
    fn from(err: serde_json::Error) -> Self {
        Self::GeoJson { message: err.to_string(), path: None }
    }
}

impl From<toml::de::Error> for CdGdpError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration { message: err.to_string(), setting: None }
    }
}
