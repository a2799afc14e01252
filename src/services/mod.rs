// Service exports
pub mod ingest;
pub mod ingv;
pub mod store;

pub use ingest::{IngestionPipeline, RefreshReport};
pub use ingv::{EventSource, IngvClient, SourceError, DEFAULT_INGV_ENDPOINT};
pub use store::{EarthquakeStore, StoreError};
