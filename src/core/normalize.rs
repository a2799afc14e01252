use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use thiserror::Error;

use crate::models::{EarthquakeRecord, RawEvent};

/// Largest magnitude accepted as physically plausible
pub const MAX_PLAUSIBLE_MAGNITUDE: f64 = 9.5;

/// Reasons a raw event is rejected during ingestion
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Turn a raw event into a storable record
///
/// Times are converted to UTC and truncated to whole seconds, magnitude is
/// rounded to two decimals and coordinates to four.
pub fn normalize(raw: &RawEvent) -> Result<EarthquakeRecord, NormalizeError> {
    let origin_time = raw
        .origin_time
        .as_deref()
        .ok_or(NormalizeError::MissingField("time"))?;
    let timestamp = parse_origin_time(origin_time)?;

    let magnitude = raw.magnitude.ok_or(NormalizeError::MissingField("magnitude"))?;
    if !magnitude.is_finite() || magnitude > MAX_PLAUSIBLE_MAGNITUDE {
        return Err(NormalizeError::OutOfRange {
            field: "magnitude",
            value: magnitude,
        });
    }

    let latitude = checked_coordinate(raw.latitude, "latitude", 90.0)?;
    let longitude = checked_coordinate(raw.longitude, "longitude", 180.0)?;

    let place = raw
        .place
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let time = timestamp.time().with_nanosecond(0).unwrap_or(timestamp.time());

    Ok(EarthquakeRecord {
        day: timestamp.date(),
        time,
        magnitude: round_to(magnitude, 2),
        latitude: round_to(latitude, 4),
        longitude: round_to(longitude, 4),
        place,
    })
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC
fn parse_origin_time(value: &str) -> Result<NaiveDateTime, NormalizeError> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&Utc).naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| NormalizeError::InvalidTimestamp(value.to_string()))
}

fn checked_coordinate(
    value: Option<f64>,
    field: &'static str,
    limit: f64,
) -> Result<f64, NormalizeError> {
    let value = value.ok_or(NormalizeError::MissingField(field))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(NormalizeError::OutOfRange { field, value });
    }
    Ok(value)
}

#[inline]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn raw_event() -> RawEvent {
        RawEvent {
            origin_time: Some("2024-05-20T18:42:12.450000".to_string()),
            magnitude: Some(4.4),
            latitude: Some(40.82834),
            longitude: Some(14.14667),
            place: Some("  Campi Flegrei ".to_string()),
        }
    }

    #[test]
    fn test_normalize_ingv_event() {
        let record = normalize(&raw_event()).unwrap();

        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(record.time, NaiveTime::from_hms_opt(18, 42, 12).unwrap());
        assert_eq!(record.magnitude, 4.4);
        assert_eq!(record.latitude, 40.8283);
        assert_eq!(record.longitude, 14.1467);
        assert_eq!(record.place, "Campi Flegrei");
    }

    #[test]
    fn test_offset_converted_to_utc() {
        let mut raw = raw_event();
        raw.origin_time = Some("2024-05-21T01:30:00+02:00".to_string());

        let record = normalize(&raw).unwrap();
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(record.time, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn test_missing_magnitude() {
        let mut raw = raw_event();
        raw.magnitude = None;
        assert_eq!(normalize(&raw), Err(NormalizeError::MissingField("magnitude")));
    }

    #[test]
    fn test_implausible_magnitude() {
        let mut raw = raw_event();
        raw.magnitude = Some(9.7);
        assert!(matches!(
            normalize(&raw),
            Err(NormalizeError::OutOfRange { field: "magnitude", .. })
        ));
    }

    #[test]
    fn test_bad_timestamp() {
        let mut raw = raw_event();
        raw.origin_time = Some("yesterday".to_string());
        assert!(matches!(normalize(&raw), Err(NormalizeError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut raw = raw_event();
        raw.latitude = Some(91.0);
        assert!(matches!(
            normalize(&raw),
            Err(NormalizeError::OutOfRange { field: "latitude", .. })
        ));
    }

    #[test]
    fn test_missing_place_is_empty() {
        let mut raw = raw_event();
        raw.place = None;
        assert_eq!(normalize(&raw).unwrap().place, "");
    }
}
