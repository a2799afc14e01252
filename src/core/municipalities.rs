use std::collections::HashSet;
use std::path::Path;

use crate::core::distance::haversine_distance;
use crate::models::{Municipality, NearbyMunicipality};
use crate::{Error, Result};

/// In-memory municipality list answering "N nearest to a point" queries
///
/// The dataset is a few hundred points at most, so lookups are a linear scan.
#[derive(Debug, Clone)]
pub struct MunicipalityIndex {
    municipalities: Vec<Municipality>,
}

impl MunicipalityIndex {
    pub fn new(municipalities: Vec<Municipality>) -> Self {
        Self { municipalities }
    }

    /// Load a `name,latitude,longitude` CSV file
    ///
    /// Duplicate names keep their first row. An empty dataset is a
    /// configuration error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                Error::Configuration(format!("cannot open municipality file {}: {}", path.display(), e))
            })?;

        let mut seen = HashSet::new();
        let mut municipalities = Vec::new();

        for row in reader.deserialize::<Municipality>() {
            let municipality = row.map_err(|e| {
                Error::Configuration(format!("malformed municipality file {}: {}", path.display(), e))
            })?;

            if !seen.insert(municipality.name.clone()) {
                tracing::warn!("Duplicate municipality '{}' ignored", municipality.name);
                continue;
            }
            municipalities.push(municipality);
        }

        if municipalities.is_empty() {
            return Err(Error::Configuration(format!(
                "municipality file {} contains no entries",
                path.display()
            )));
        }

        tracing::info!("Loaded {} municipalities from {}", municipalities.len(), path.display());

        Ok(Self::new(municipalities))
    }

    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    /// The `n` municipalities closest to (`lat`, `lon`), nearest first
    ///
    /// Ties keep dataset order. Returns `min(n, len)` entries.
    pub fn nearest(&self, lat: f64, lon: f64, n: usize) -> Result<Vec<NearbyMunicipality>> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "number of municipalities must be positive".to_string(),
            ));
        }

        let mut ranked: Vec<NearbyMunicipality> = self
            .municipalities
            .iter()
            .map(|m| NearbyMunicipality {
                name: m.name.clone(),
                distance_km: haversine_distance(lat, lon, m.latitude, m.longitude),
            })
            .collect();

        // `sort_by` is stable
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked.truncate(n);

        Ok(ranked)
    }
}
