// Model exports
pub mod domain;
pub mod ingv;

pub use domain::{BoundingBox, EarthquakeRecord, Municipality, NearbyMunicipality, QueryCriteria, RawEvent};
pub use ingv::{IngvFeature, IngvFeatureCollection};
