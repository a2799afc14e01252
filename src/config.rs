use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::services::DEFAULT_INGV_ENDPOINT;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ingv: IngvSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngvSettings {
    #[serde(default = "default_ingv_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl IngvSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IngvSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ingv_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ingv_endpoint() -> String { DEFAULT_INGV_ENDPOINT.to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String { "sqlite://data/earthquakes.db".to_string() }
fn default_max_connections() -> u32 { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_bounding_box_path")]
    pub bounding_box_path: PathBuf,
    #[serde(default = "default_municipalities_path")]
    pub municipalities_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            bounding_box_path: default_bounding_box_path(),
            municipalities_path: default_municipalities_path(),
        }
    }
}

fn default_bounding_box_path() -> PathBuf { PathBuf::from("data/bounding_box.csv") }
fn default_municipalities_path() -> PathBuf { PathBuf::from("data/italian_municipalities.csv") }

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySettings {
    /// Municipalities listed per event with `--closest-municipalities`
    #[serde(default = "default_closest_municipalities")]
    pub closest_municipalities: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            closest_municipalities: default_closest_municipalities(),
        }
    }
}

fn default_closest_municipalities() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "full".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with QUAKE)
    pub fn load() -> Result<Self, ConfigError> {
        Self::layered(Path::new("config"), None)
    }

    /// Same layers as [`Settings::load`], with `path` applied over the local
    /// overrides and under the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::layered(Path::new("config"), Some(path.as_ref()))
    }

    fn layered(config_dir: &Path, extra: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join("local")).required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path));
        }

        // e.g., QUAKE__INGV__TIMEOUT_SECS -> ingv.timeout_secs
        let settings = builder.add_source(environment()).build()?;

        apply_database_url(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("QUAKE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// `DATABASE_URL` takes precedence over every other database.url source
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
