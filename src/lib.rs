//! Quake Watch - ranked queries over recent Italian earthquakes
//!
//! Events are pulled from the INGV FDSN event service, filtered to Italy's
//! bounding box and stored in a local SQLite database without duplicates.
//! Queries return the strongest events in a time window, optionally with the
//! nearest municipalities to each epicenter.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{haversine_distance, GeoBoundingBox, MunicipalityIndex};
pub use error::{Error, Result};
pub use models::{BoundingBox, EarthquakeRecord, Municipality, NearbyMunicipality, QueryCriteria, RawEvent};
pub use services::{EarthquakeStore, EventSource, IngestionPipeline, IngvClient};
