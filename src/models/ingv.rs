use serde::Deserialize;
use serde_json::Value;

use super::domain::RawEvent;

/// GeoJSON FeatureCollection returned by the FDSN event service
///
/// Features are kept as raw JSON so that a single unusable feature can be
/// skipped without rejecting the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct IngvFeatureCollection {
    pub features: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngvFeature {
    pub properties: IngvProperties,
    pub geometry: Option<IngvGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngvProperties {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngvGeometry {
    /// `[longitude, latitude, depth_km]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl From<IngvFeature> for RawEvent {
    fn from(feature: IngvFeature) -> Self {
        let coordinates = feature
            .geometry
            .map(|g| g.coordinates)
            .unwrap_or_default();

        RawEvent {
            origin_time: feature.properties.time,
            magnitude: feature.properties.mag,
            latitude: coordinates.get(1).copied(),
            longitude: coordinates.first().copied(),
            place: feature.properties.place,
        }
    }
}
