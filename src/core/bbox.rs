use std::collections::HashMap;
use std::path::Path;

use crate::models::BoundingBox;
use crate::{Error, Result};

const MIN_LAT_KEY: &str = "minlatitude";
const MAX_LAT_KEY: &str = "maxlatitude";
const MIN_LON_KEY: &str = "minlongitude";
const MAX_LON_KEY: &str = "maxlongitude";

/// Immutable geographic filter applied to events at ingestion time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBoundingBox {
    bounds: BoundingBox,
}

impl GeoBoundingBox {
    /// Wrap a bounding box, rejecting inverted, non-finite or off-globe bounds
    pub fn new(bounds: BoundingBox) -> Result<Self> {
        let values = [bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Configuration(format!(
                "bounding box has non-finite bounds: {:?}",
                bounds
            )));
        }

        let on_globe = (-90.0..=90.0).contains(&bounds.min_lat)
            && (-90.0..=90.0).contains(&bounds.max_lat)
            && (-180.0..=180.0).contains(&bounds.min_lon)
            && (-180.0..=180.0).contains(&bounds.max_lon);
        if !on_globe {
            return Err(Error::Configuration(format!(
                "bounding box must lie within ±90 latitude and ±180 longitude: {:?}",
                bounds
            )));
        }

        if bounds.min_lat >= bounds.max_lat || bounds.min_lon >= bounds.max_lon {
            return Err(Error::Configuration(format!(
                "bounding box must satisfy min < max on both axes: {:?}",
                bounds
            )));
        }

        Ok(Self { bounds })
    }

    /// Rectangle covering the Italian territory
    pub fn italy() -> Self {
        Self {
            bounds: BoundingBox {
                min_lat: 35.0,
                max_lat: 47.5,
                min_lon: 5.0,
                max_lon: 20.0,
            },
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Inclusive on every edge
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.bounds.min_lat
            && lat <= self.bounds.max_lat
            && lon >= self.bounds.min_lon
            && lon <= self.bounds.max_lon
    }

    /// Read a `key,value` bounding box file
    ///
    /// Expected keys: `minlatitude`, `maxlatitude`, `minlongitude`, `maxlongitude`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                Error::Configuration(format!("cannot open bounding box file {}: {}", path.display(), e))
            })?;

        let mut values: HashMap<String, f64> = HashMap::new();
        for row in reader.records() {
            let row = row.map_err(|e| {
                Error::Configuration(format!("malformed bounding box file {}: {}", path.display(), e))
            })?;

            let (Some(key), Some(raw)) = (row.get(0), row.get(1)) else {
                return Err(Error::Configuration(format!(
                    "bounding box row must be `key,value`: {:?}",
                    row
                )));
            };

            let value: f64 = raw.parse().map_err(|_| {
                Error::Configuration(format!("bounding box value for {} is not a number: {}", key, raw))
            })?;
            values.insert(key.to_string(), value);
        }

        let get = |key: &str| {
            values.get(key).copied().ok_or_else(|| {
                Error::Configuration(format!("bounding box file {} is missing {}", path.display(), key))
            })
        };

        Self::new(BoundingBox {
            min_lat: get(MIN_LAT_KEY)?,
            max_lat: get(MAX_LAT_KEY)?,
            min_lon: get(MIN_LON_KEY)?,
            max_lon: get(MAX_LON_KEY)?,
        })
    }

    /// Write this box as a `key,value` file, creating parent directories
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let to_config_error = |e: &dyn std::fmt::Display| {
            Error::Configuration(format!("cannot write bounding box file {}: {}", path.display(), e))
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| to_config_error(&e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| to_config_error(&e))?;

        let rows = [
            (MIN_LAT_KEY, self.bounds.min_lat),
            (MAX_LAT_KEY, self.bounds.max_lat),
            (MIN_LON_KEY, self.bounds.min_lon),
            (MAX_LON_KEY, self.bounds.max_lon),
        ];
        for (key, value) in rows {
            writer
                .write_record([key, value.to_string().as_str()])
                .map_err(|e| to_config_error(&e))?;
        }
        writer.flush().map_err(|e| to_config_error(&e))?;

        Ok(())
    }

    /// Load the box file, generating it from the Italy defaults when absent
    pub fn load_or_generate<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Bounding box file {} not found, generating defaults", path.display());
            Self::italy().write(path)?;
        }
        Self::load(path)
    }
}

impl Default for GeoBoundingBox {
    fn default() -> Self {
        Self::italy()
    }
}
