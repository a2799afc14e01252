use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A normalized earthquake event as stored in the local database
///
/// Identity is the full tuple of all six fields: two records that agree on
/// every field are the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub day: NaiveDate,
    pub time: NaiveTime,
    #[serde(rename = "mag")]
    pub magnitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub place: String,
}

/// Geospatial bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// A named place with coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Result of a proximity lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyMunicipality {
    pub name: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Ranked query parameters: top `limit` events of at least `min_magnitude`
/// within the last `window_days` days
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct QueryCriteria {
    #[validate(range(min = 1, message = "window must be at least one day"))]
    #[serde(rename = "windowDays")]
    pub window_days: i64,
    #[serde(rename = "minMagnitude")]
    pub min_magnitude: f64,
    #[validate(range(min = 1, message = "limit must be positive"))]
    pub limit: i64,
}

impl QueryCriteria {
    /// Build and validate criteria
    pub fn new(window_days: i64, min_magnitude: f64, limit: i64) -> crate::Result<Self> {
        let criteria = Self {
            window_days,
            min_magnitude,
            limit,
        };

        criteria.validate().map_err(|errors| {
            crate::Error::InvalidArgument(format!("invalid query criteria: {}", errors))
        })?;

        if !min_magnitude.is_finite() {
            return Err(crate::Error::InvalidArgument(format!(
                "minimum magnitude must be a finite number, got {}",
                min_magnitude
            )));
        }

        Ok(criteria)
    }
}

/// One event as delivered by the data source, before any validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub origin_time: Option<String>,
    pub magnitude: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place: Option<String>,
}
