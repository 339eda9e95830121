//! Boundary file reader (fallback Child Unit strategy)
//!
//! Takes census division and province codes straight from the per-feature properties
//! of a GeoJSON FeatureCollection. Geometry is ignored and every division gets the
//! default weight.

use crate::config::{BoundaryConfig, ProvinceTable};
use crate::error::{CdGdpError, Result};
use cdgdp_types::ChildUnit;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Features stay untyped so one malformed entry cannot fail the whole document.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Value>,
}

pub struct BoundarySource<'a> {
    config: &'a BoundaryConfig,
    provinces: &'a ProvinceTable,
    default_weight: f64,
}

impl<'a> BoundarySource<'a> {
    pub fn new(config: &'a BoundaryConfig, provinces: &'a ProvinceTable, default_weight: f64) -> Self {
        Self { config, provinces, default_weight }
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Vec<ChildUnit>> {
        let file = File::open(path).map_err(|err| CdGdpError::io(path, &err))?;
        self.load_from_reader(BufReader::new(file), path)
    }

    pub fn load_from_reader<R: Read>(&self, reader: R, origin: &Path) -> Result<Vec<ChildUnit>> {
        let collection: FeatureCollection = serde_json::from_reader(reader)
            .map_err(|err| CdGdpError::geojson(origin, err.to_string()))?;

        let mut units = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut skipped = 0usize;

        for (index, feature) in collection.features.iter().enumerate() {
            let Some(properties) = feature.get("properties").and_then(Value::as_object) else {
                debug!(feature = index, "Skipping feature without a properties object");
                skipped += 1;
                continue;
            };
            let child_id = property_text(properties.get(&self.config.child_property));
            let parent_id = property_text(properties.get(&self.config.parent_property));
            let (Some(child_id), Some(parent_id)) = (child_id, parent_id) else {
                debug!(feature = index, "Skipping feature without division or province code");
                skipped += 1;
                continue;
            };

            if !seen.insert((child_id.clone(), parent_id.clone())) {
                continue;
            }
            if !self.provinces.contains_code(&parent_id) {
                debug!(feature = index, province = %parent_id, "Skipping feature in unknown province");
                skipped += 1;
                continue;
            }

            units.push(ChildUnit::new(child_id, parent_id, self.default_weight));
        }

        info!(
            divisions = units.len(),
            features = collection.features.len(),
            skipped_features = skipped,
            "Loaded census divisions from boundary file"
        );
        Ok(units)
    }
}

/// Reads a code property that may be stored as a string or a number.
fn property_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
            _ => n.to_string(),
        },
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
