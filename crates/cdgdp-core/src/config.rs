use crate::error::{CdGdpError, Result};
use cdgdp_types::Province;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "default_province_gdp_csv")]
    pub province_gdp_csv: PathBuf,
    #[serde(default = "default_census_profile_csv")]
    pub census_profile_csv: PathBuf,
    #[serde(default = "default_boundary_geojson")]
    pub boundary_geojson: PathBuf,
    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,
}

/// Layout of the province-level GDP table. Columns are zero-based positions.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ProvinceGdpConfig {
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default)]
    pub period_column: usize,
    #[serde(default = "default_name_column")]
    pub name_column: usize,
    #[serde(default = "default_value_column")]
    pub value_column: usize,
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,
}

/// Column names of the census profile table
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CensusProfileConfig {
    #[serde(default = "default_geo_level_column")]
    pub geo_level_column: String,
    #[serde(default = "default_geo_level_value")]
    pub geo_level_value: String,
    #[serde(default = "default_uid_column")]
    pub uid_column: String,
    #[serde(default = "default_characteristic_column")]
    pub characteristic_column: String,
    #[serde(default = "default_count_column")]
    pub count_column: String,
    #[serde(default = "default_population_characteristic")]
    pub population_characteristic: String,
    #[serde(default = "default_weight")]
    pub default_weight: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    #[serde(default = "default_child_property")]
    pub child_property: String,
    #[serde(default = "default_parent_property")]
    pub parent_property: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_weight_header")]
    pub weight_header: String,
    #[serde(default = "default_value_header")]
    pub value_header: String,
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

/// The fixed table of parent units the sources recognise.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceTable {
    provinces: Vec<Province>,
}

impl Default for ProvinceTable {
    fn default() -> Self {
        Self { provinces: Province::ALL.to_vec() }
    }
}

impl ProvinceTable {
    pub fn code_for_name(&self, name: &str) -> Option<&'static str> {
        let name = name.trim();
        self.provinces.iter().find(|p| p.name() == name).map(|p| p.code())
    }

    pub fn name_for_code(&self, code: &str) -> Option<&'static str> {
        self.province(code).map(|p| p.name())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.province(code).is_some()
    }

    pub fn province(&self, code: &str) -> Option<Province> {
        let code = code.trim();
        self.provinces.iter().copied().find(|p| p.code() == code)
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}

/// Run configuration, loaded once and read-only afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CdGdpConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub province_gdp: ProvinceGdpConfig,
    #[serde(default)]
    pub census_profile: CensusProfileConfig,
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(skip)]
    pub provinces: ProvinceTable,
}

impl Default for CdGdpConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            province_gdp: ProvinceGdpConfig::default(),
            census_profile: CensusProfileConfig::default(),
            boundary: BoundaryConfig::default(),
            output: OutputConfig::default(),
            provinces: ProvinceTable::default(),
        }
    }
}

impl CdGdpConfig {
    /// Loads the configuration file at `path`, falling back to defaults when it does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Configuration file '{}' not found. Using default configuration.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(CdGdpError::io(path, &err)),
        };

        let config = Self::from_toml(&config_str)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `CDGDP_*` environment variable overrides.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("CDGDP_PROVINCE_GDP_CSV") {
            self.paths.province_gdp_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("CDGDP_CENSUS_PROFILE_CSV") {
            self.paths.census_profile_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("CDGDP_BOUNDARY_GEOJSON") {
            self.paths.boundary_geojson = PathBuf::from(path);
        }
        if let Some(path) = lookup("CDGDP_OUTPUT_CSV") {
            self.paths.output_csv = PathBuf::from(path);
        }
        if let Some(period) = lookup("CDGDP_PERIOD") {
            self.province_gdp.period = period;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let gdp = &self.province_gdp;
        let widest = gdp.period_column.max(gdp.name_column).max(gdp.value_column);
        if gdp.min_columns <= widest {
            return Err(CdGdpError::configuration(
                "province_gdp.min_columns",
                format!(
                    "min_columns ({}) must exceed the highest configured column index ({widest})",
                    gdp.min_columns
                ),
            ));
        }
        if self.output.decimals > MAX_DECIMALS {
            return Err(CdGdpError::configuration(
                "output.decimals",
                format!("at most {MAX_DECIMALS} decimals are supported, got {}", self.output.decimals),
            ));
        }
        let weight = self.census_profile.default_weight;
        if !weight.is_finite() || weight < 0.0 {
            return Err(CdGdpError::configuration(
                "census_profile.default_weight",
                format!("default weight must be finite and non-negative, got {weight}"),
            ));
        }
        Ok(())
    }
}

const MAX_DECIMALS: usize = 12;

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            province_gdp_csv: default_province_gdp_csv(),
            census_profile_csv: default_census_profile_csv(),
            boundary_geojson: default_boundary_geojson(),
            output_csv: default_output_csv(),
        }
    }
}

impl Default for ProvinceGdpConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            period_column: 0,
            name_column: default_name_column(),
            value_column: default_value_column(),
            min_columns: default_min_columns(),
        }
    }
}

impl Default for CensusProfileConfig {
    fn default() -> Self {
        Self {
            geo_level_column: default_geo_level_column(),
            geo_level_value: default_geo_level_value(),
            uid_column: default_uid_column(),
            characteristic_column: default_characteristic_column(),
            count_column: default_count_column(),
            population_characteristic: default_population_characteristic(),
            default_weight: default_weight(),
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { child_property: default_child_property(), parent_property: default_parent_property() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            weight_header: default_weight_header(),
            value_header: default_value_header(),
            decimals: default_decimals(),
        }
    }
}

fn default_province_gdp_csv() -> PathBuf {
    PathBuf::from("data/province-level-gdp.csv")
}
fn default_census_profile_csv() -> PathBuf {
    PathBuf::from("data/provinces/98-401-X2021020_English_CSV_data.csv")
}
fn default_boundary_geojson() -> PathBuf {
    PathBuf::from("canada_census_divisions.geojson")
}
fn default_output_csv() -> PathBuf {
    PathBuf::from("data/census_division_gdp_2021.csv")
}

fn default_period() -> String {
    "2021".to_string()
}
fn default_name_column() -> usize {
    1
}
fn default_value_column() -> usize {
    11
}
fn default_min_columns() -> usize {
    12
}

fn default_geo_level_column() -> String {
    "GEO_LEVEL".to_string()
}
fn default_geo_level_value() -> String {
    "Census division".to_string()
}
fn default_uid_column() -> String {
    "ALT_GEO_CODE".to_string()
}
fn default_characteristic_column() -> String {
    "CHARACTERISTIC_NAME".to_string()
}
fn default_count_column() -> String {
    "C1_COUNT_TOTAL".to_string()
}
fn default_population_characteristic() -> String {
    "Population, 2021".to_string()
}
fn default_weight() -> f64 {
    1.0
}

fn default_child_property() -> String {
    "cd_code".to_string()
}
fn default_parent_property() -> String {
    "prov_code".to_string()
}

fn default_weight_header() -> String {
    "population_2021".to_string()
}
fn default_value_header() -> String {
    "gdp_2021_millions".to_string()
}
fn default_decimals() -> usize {
    3
}
