// Core algorithm exports
pub mod bbox;
pub mod distance;
pub mod municipalities;
pub mod normalize;

pub use bbox::GeoBoundingBox;
pub use distance::haversine_distance;
pub use municipalities::MunicipalityIndex;
pub use normalize::{normalize, NormalizeError, MAX_PLAUSIBLE_MAGNITUDE};
