use thiserror::Error;

use crate::services::{SourceError, StoreError};

/// Top-level error kinds surfaced to the command line
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed bounding box, municipality or settings data
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Earthquake source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<config::ConfigError> for Error {
    fn from(value: config::ConfigError) -> Self {
        Error::Configuration(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
