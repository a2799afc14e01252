use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::models::{BoundingBox, IngvFeature, IngvFeatureCollection, RawEvent};

/// Public FDSN event endpoint of the Istituto Nazionale di Geofisica e Vulcanologia
pub const DEFAULT_INGV_ENDPOINT: &str = "https://webservices.ingv.it/fdsnws/event/1/query";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors that can occur when fetching events from the data source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Anything that can list recent earthquakes inside a bounding box
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(
        &self,
        window_days: i64,
        bbox: &BoundingBox,
    ) -> Result<Vec<RawEvent>, SourceError>;
}

/// INGV FDSN event web service client
///
/// Requests GeoJSON for the given window and box. Features that cannot be
/// decoded are logged and skipped rather than failing the whole response.
pub struct IngvClient {
    endpoint: String,
    client: Client,
}

impl IngvClient {
    /// Create a new client with a bounded request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSource for IngvClient {
    async fn fetch_events(
        &self,
        window_days: i64,
        bbox: &BoundingBox,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let end = Utc::now();
        let start = ChronoDuration::try_days(window_days)
            .and_then(|window| end.checked_sub_signed(window))
            .ok_or_else(|| SourceError::ApiError(format!("window of {} days is too large", window_days)))?;

        let params = [
            ("format", "geojson".to_string()),
            ("starttime", start.format(TIMESTAMP_FORMAT).to_string()),
            ("endtime", end.format(TIMESTAMP_FORMAT).to_string()),
            ("minlatitude", bbox.min_lat.to_string()),
            ("maxlatitude", bbox.max_lat.to_string()),
            ("minlongitude", bbox.min_lon.to_string()),
            ("maxlongitude", bbox.max_lon.to_string()),
        ];

        tracing::debug!("Fetching events from {} for the last {} days", self.endpoint, window_days);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        // FDSN services answer 204 when nothing matches
        if response.status() == StatusCode::NO_CONTENT {
            tracing::info!("No events reported for the last {} days", window_days);
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Event service returned {}: {}", status, body.trim());
            return Err(SourceError::ApiError(format!(
                "Failed to fetch events: {}",
                status
            )));
        }

        let body = response.text().await?;
        let collection: IngvFeatureCollection = serde_json::from_str(&body)
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse events: {}", e)))?;

        let total = collection.features.len();
        let events: Vec<RawEvent> = collection
            .features
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<IngvFeature>(value) {
                Ok(feature) => Some(RawEvent::from(feature)),
                Err(e) => {
                    tracing::warn!("Skipping undecodable feature: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Decoded {} of {} features", events.len(), total);

        Ok(events)
    }
}
