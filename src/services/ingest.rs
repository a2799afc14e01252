use crate::core::{normalize, GeoBoundingBox};
use crate::models::EarthquakeRecord;
use crate::services::{EarthquakeStore, EventSource};
use crate::{Error, Result};

/// Outcome of a single refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub fetched: usize,
    pub malformed: usize,
    pub outside_bbox: usize,
    pub inserted: u64,
    pub duplicates: u64,
}

/// Fetch, normalize, geo-filter and store recent earthquakes
///
/// # Pipeline Stages
/// 1. Fetch raw events for the window from the source
/// 2. Normalize (malformed events are skipped)
/// 3. Bounding box filter
/// 4. Insert-or-skip into the store
pub struct IngestionPipeline<'a, S: EventSource + ?Sized> {
    source: &'a S,
    store: &'a EarthquakeStore,
    bbox: GeoBoundingBox,
}

impl<'a, S: EventSource + ?Sized> IngestionPipeline<'a, S> {
    pub fn new(source: &'a S, store: &'a EarthquakeStore, bbox: GeoBoundingBox) -> Self {
        Self { source, store, bbox }
    }

    /// Pull the last `window_days` days of events into the store
    ///
    /// Returns the number of newly stored events. A source failure leaves the
    /// store untouched.
    pub async fn refresh(&self, window_days: i64) -> Result<u64> {
        Ok(self.refresh_with_report(window_days).await?.inserted)
    }

    pub async fn refresh_with_report(&self, window_days: i64) -> Result<RefreshReport> {
        if window_days <= 0 {
            return Err(Error::InvalidArgument(format!(
                "window must be at least one day, got {}",
                window_days
            )));
        }

        let raw_events = self
            .source
            .fetch_events(window_days, self.bbox.bounds())
            .await?;

        let mut report = RefreshReport {
            fetched: raw_events.len(),
            ..RefreshReport::default()
        };

        let batch: Vec<EarthquakeRecord> = raw_events
            .iter()
            .filter_map(|raw| match normalize(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed event {:?}: {}", raw.origin_time, e);
                    report.malformed += 1;
                    None
                }
            })
            .filter(|record| {
                let inside = self.bbox.contains(record.latitude, record.longitude);
                if !inside {
                    tracing::debug!(
                        "Discarding event outside bounding box: {} ({}, {})",
                        record.place,
                        record.latitude,
                        record.longitude
                    );
                    report.outside_bbox += 1;
                }
                inside
            })
            .collect();

        report.inserted = self.store.insert_batch(&batch).await?;
        report.duplicates = batch.len() as u64 - report.inserted;

        tracing::info!(
            "Refresh complete: fetched={}, malformed={}, outside_bbox={}, inserted={}, duplicates={}",
            report.fetched,
            report.malformed,
            report.outside_bbox,
            report.inserted,
            report.duplicates
        );

        Ok(report)
    }
}
