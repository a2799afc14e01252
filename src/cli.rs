use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;

use crate::config::Settings;
use crate::core::{GeoBoundingBox, MunicipalityIndex};
use crate::models::{EarthquakeRecord, NearbyMunicipality, QueryCriteria};
use crate::services::{EarthquakeStore, IngestionPipeline, IngvClient};
use crate::{Error, Result};

/// Fetch the strongest earthquakes in Italy within the given number of days,
/// based on the given magnitude and count (K)
#[derive(Parser, Debug)]
#[command(name = "quake-watch")]
#[command(version, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Number of days in the past to fetch earthquake data for
    #[arg(long)]
    pub days: i64,

    /// The maximum number of strongest earthquakes to return
    #[arg(long = "K", short = 'k')]
    pub k: i64,

    /// The minimum magnitude of earthquakes to consider
    #[arg(long)]
    pub magnitude: f64,

    /// Show the closest Italian municipalities for each earthquake
    #[arg(long)]
    pub closest_municipalities: bool,

    /// Query the local database without contacting the event service
    #[arg(long)]
    pub no_refresh: bool,

    /// Alternative configuration file
    #[arg(long, env = "QUAKE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// One result line: `day: .., time: .., magnitude: .., lat: .., lon: .., place: ..`
pub fn format_record(record: &EarthquakeRecord) -> String {
    format!(
        "day: {}, time: {}, magnitude: {:?}, lat: {:?}, lon: {:?}, place: {}",
        record.day.format("%Y-%m-%d"),
        record.time.format("%H:%M:%S"),
        record.magnitude,
        record.latitude,
        record.longitude,
        record.place
    )
}

/// Indented proximity line with two-decimal distance
pub fn format_nearby(nearby: &NearbyMunicipality) -> String {
    format!("  - {}: {:.2} km", nearby.name, nearby.distance_km)
}

/// Validate, refresh, query and render the result lines
///
/// Arguments and settings are checked before any file, database or network
/// access. Nothing is returned on error, so callers never print a partial
/// result.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<Vec<String>> {
    let criteria = QueryCriteria::new(cli.days, cli.magnitude, cli.k)?;
    let closest = if cli.closest_municipalities {
        Some(closest_count(settings.query.closest_municipalities)?)
    } else {
        None
    };

    let bbox = GeoBoundingBox::load_or_generate(&settings.data.bounding_box_path)?;
    info!("Bounding box loaded: {:?}", bbox.bounds());

    let municipalities = match closest {
        Some(n) => Some((MunicipalityIndex::load(&settings.data.municipalities_path)?, n)),
        None => None,
    };

    let store = EarthquakeStore::connect(&settings.database.url, settings.database.max_connections).await?;
    let outcome = query_with_refresh(cli, settings, &store, bbox, &criteria).await;
    store.close().await;
    let earthquakes = outcome?;

    info!("Found {} earthquakes matching the criteria", earthquakes.len());

    let mut lines = Vec::with_capacity(earthquakes.len());
    for record in &earthquakes {
        lines.push(format_record(record));

        if let Some((index, n)) = &municipalities {
            for nearby in index.nearest(record.latitude, record.longitude, n.get())? {
                lines.push(format_nearby(&nearby));
            }
        }
    }

    Ok(lines)
}

fn closest_count(n: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(n).ok_or_else(|| {
        Error::InvalidArgument("query.closest_municipalities must be positive".to_string())
    })
}

async fn query_with_refresh(
    cli: &Cli,
    settings: &Settings,
    store: &EarthquakeStore,
    bbox: GeoBoundingBox,
    criteria: &QueryCriteria,
) -> Result<Vec<EarthquakeRecord>> {
    if cli.no_refresh {
        info!("Skipping refresh, querying local database only");
    } else {
        let source = IngvClient::new(settings.ingv.endpoint.clone(), settings.ingv.timeout())?;
        let pipeline = IngestionPipeline::new(&source, store, bbox);
        pipeline.refresh(criteria.window_days).await?;
    }

    Ok(store.query(criteria).await?)
}
