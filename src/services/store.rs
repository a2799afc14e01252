use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::{EarthquakeRecord, QueryCriteria};

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Errors that can occur when interacting with the earthquake database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// SQLite-backed earthquake store
///
/// Rows are unique on all six columns, so re-ingesting an overlapping window
/// never duplicates an event. A constructed store always has its schema in
/// place.
pub struct EarthquakeStore {
    pool: SqlitePool,
}

impl EarthquakeStore {
    /// Connect to a SQLite database URL, creating the file if needed
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        tracing::info!("Opening earthquake database: {}", database_url);

        Self::with_options(options, max_connections).await
    }

    /// Open a database file by path, creating it and its directory if needed
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        Self::with_options(options, 1).await
    }

    async fn with_options(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        // No idle reaping: an in-memory database lives only as long as its connection
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        // Schema creation is idempotent
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Insert every record not already stored, returning how many were new
    ///
    /// The batch is written in a single transaction: on error nothing from it
    /// is committed.
    pub async fn insert_batch(&self, records: &[EarthquakeRecord]) -> Result<u64, StoreError> {
        let query = r#"
            INSERT INTO earthquakes (day, time, mag, latitude, longitude, place)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (day, time, mag, latitude, longitude, place) DO NOTHING
        "#;

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for record in records {
            let result = sqlx::query(query)
                .bind(record.day.format(DAY_FORMAT).to_string())
                .bind(record.time.format(TIME_FORMAT).to_string())
                .bind(record.magnitude)
                .bind(record.latitude)
                .bind(record.longitude)
                .bind(&record.place)
                .execute(&mut *tx)
                .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!(
            "Inserted {} of {} records ({} duplicates)",
            inserted,
            records.len(),
            records.len() as u64 - inserted
        );

        Ok(inserted)
    }

    /// Strongest events within the window ending today (UTC)
    pub async fn query(&self, criteria: &QueryCriteria) -> Result<Vec<EarthquakeRecord>, StoreError> {
        self.query_as_of(criteria, Utc::now().date_naive()).await
    }

    /// Strongest events with `day` in `[today - window_days, today]`
    ///
    /// Ordered by magnitude descending, then insertion order.
    pub async fn query_as_of(
        &self,
        criteria: &QueryCriteria,
        today: NaiveDate,
    ) -> Result<Vec<EarthquakeRecord>, StoreError> {
        let window = Days::new(criteria.window_days.max(0) as u64);
        let first_day = today.checked_sub_days(window).unwrap_or(NaiveDate::MIN);

        let query = r#"
            SELECT day, time, mag, latitude, longitude, place
            FROM earthquakes
            WHERE mag >= ?
              AND day >= ?
              AND day <= ?
            ORDER BY mag DESC, rowid ASC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(criteria.min_magnitude)
            .bind(first_day.format(DAY_FORMAT).to_string())
            .bind(today.format(DAY_FORMAT).to_string())
            .bind(criteria.limit)
            .fetch_all(&self.pool)
            .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Query (days={}, min_mag={}, limit={}) returned {} records",
            criteria.window_days,
            criteria.min_magnitude,
            criteria.limit,
            records.len()
        );

        Ok(records)
    }

    /// Total number of stored events
    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM earthquakes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    pub async fn max_magnitude(&self) -> Result<Option<f64>, StoreError> {
        let max: Option<f64> = sqlx::query_scalar("SELECT MAX(mag) FROM earthquakes")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &SqliteRow) -> Result<EarthquakeRecord, StoreError> {
    let day: String = row.try_get("day")?;
    let time: String = row.try_get("time")?;

    Ok(EarthquakeRecord {
        day: NaiveDate::parse_from_str(&day, DAY_FORMAT)
            .map_err(|e| StoreError::Corrupt(format!("day '{}': {}", day, e)))?,
        time: NaiveTime::parse_from_str(&time, TIME_FORMAT)
            .map_err(|e| StoreError::Corrupt(format!("time '{}': {}", time, e)))?,
        magnitude: row.try_get("mag")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        place: row.try_get("place")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: NaiveDate, magnitude: f64) -> EarthquakeRecord {
        EarthquakeRecord {
            day,
            time: NaiveTime::from_hms_opt(3, 36, 32).unwrap(),
            magnitude,
            latitude: 42.7,
            longitude: 13.23,
            place: "1 km W Accumoli (RI)".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = EarthquakeStore::connect("sqlite::memory:", 1).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 8, 30).unwrap();

        let inserted = store.insert_batch(&[record(today, 6.0)]).await.unwrap();
        assert_eq!(inserted, 1);

        let criteria = QueryCriteria::new(7, 0.0, 10).unwrap();
        let results = store.query_as_of(&criteria, today).await.unwrap();

        assert_eq!(results, vec![record(today, 6.0)]);
    }

    #[tokio::test]
    async fn test_duplicates_within_batch_counted_once() {
        let store = EarthquakeStore::connect("sqlite::memory:", 1).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();

        let inserted = store
            .insert_batch(&[record(day, 6.0), record(day, 6.0), record(day, 6.1)])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = EarthquakeStore::connect("sqlite::memory:", 1).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.max_magnitude().await.unwrap(), None);
    }
}
