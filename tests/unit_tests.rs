// Unit tests for Quake Watch

use quake_watch::core::{
    bbox::GeoBoundingBox,
    distance::haversine_distance,
    municipalities::MunicipalityIndex,
    normalize::{normalize, NormalizeError, MAX_PLAUSIBLE_MAGNITUDE},
};
use quake_watch::models::{BoundingBox, Municipality, RawEvent};
use quake_watch::Error;

fn sample_points() -> Vec<(f64, f64)> {
    vec![
        (45.4064, 11.8768),  // Padova
        (44.8015, 10.3279),  // Parma
        (38.1157, 13.3615),  // Palermo
        (90.0, 0.0),         // North pole
        (-90.0, 45.0),       // South pole
        (10.0, 180.0),       // Antimeridian
        (-33.8688, -180.0),  // Antimeridian, west side
    ]
}

#[test]
fn test_haversine_distance_zero() {
    for (lat, lon) in sample_points() {
        let distance = haversine_distance(lat, lon, lat, lon);
        assert!(distance.abs() < 1e-9, "({}, {}) -> {}", lat, lon, distance);
    }
}

#[test]
fn test_haversine_distance_symmetric() {
    let points = sample_points();
    for &(lat1, lon1) in &points {
        for &(lat2, lon2) in &points {
            let forward = haversine_distance(lat1, lon1, lat2, lon2);
            let backward = haversine_distance(lat2, lon2, lat1, lon1);
            assert!((forward - backward).abs() < 1e-9);
            assert!(forward >= 0.0);
            assert!(forward.is_finite());
        }
    }
}

#[test]
fn test_haversine_distance_padova_to_palermo() {
    // Padova to Palermo is approximately 820 km
    let distance = haversine_distance(45.4064, 11.8768, 38.1157, 13.3615);
    assert!(distance > 800.0 && distance < 950.0, "got {}", distance);
}

#[test]
fn test_haversine_antipodal_bound() {
    let distance = haversine_distance(42.0, 12.0, -42.0, -168.0);
    assert!((distance - 6371.0 * std::f64::consts::PI).abs() < 0.01);
}

#[test]
fn test_bounding_box_italian_cities() {
    let bbox = GeoBoundingBox::italy();

    let cities = [
        ("Padova", 45.41, 11.88),
        ("Parma", 44.80, 10.33),
        ("Palermo", 38.12, 13.36),
    ];

    for (city, lat, lon) in cities {
        assert!(bbox.contains(lat, lon), "{} should be inside the box", city);
    }
}

#[test]
fn test_bounding_box_outside() {
    let bbox = GeoBoundingBox::italy();

    assert!(!bbox.contains(60.0, 12.0)); // Scandinavia
    assert!(!bbox.contains(41.9, 2.2)); // Catalonia
    assert!(!bbox.contains(30.0, 31.2)); // Egypt
}

#[test]
fn test_bounding_box_round_trip_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bounding_box.csv");

    let custom = GeoBoundingBox::new(BoundingBox {
        min_lat: 36.5,
        max_lat: 47.1,
        min_lon: 6.6,
        max_lon: 18.5,
    })
    .unwrap();
    custom.write(&path).unwrap();

    // Existing file is never overwritten by the generator
    let loaded = GeoBoundingBox::load_or_generate(&path).unwrap();
    assert_eq!(loaded, custom);
}

#[test]
fn test_bounding_box_unreadable_file() {
    let result = GeoBoundingBox::load("/nonexistent/bounding_box.csv");
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_nearest_five_sorted() {
    let municipalities: Vec<Municipality> = (0..12)
        .map(|i| Municipality {
            name: format!("Comune {}", i),
            latitude: 42.0 + i as f64 * 0.1,
            longitude: 12.5,
        })
        .collect();
    let index = MunicipalityIndex::new(municipalities);

    let nearest = index.nearest(42.55, 12.5, 5).unwrap();

    assert_eq!(nearest.len(), 5);
    assert!(nearest.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[test]
fn test_bundled_municipality_dataset() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/italian_municipalities.csv");
    let index = MunicipalityIndex::load(path).unwrap();

    assert!(index.len() >= 5);

    // Central Italy, 2016 Norcia mainshock
    let nearest = index.nearest(42.83, 13.11, 5).unwrap();
    assert_eq!(nearest.len(), 5);
    assert_eq!(nearest[0].name, "Norcia");
}

#[test]
fn test_normalize_rejects_implausible_magnitude() {
    let raw = RawEvent {
        origin_time: Some("2024-03-01T10:00:00.000000".to_string()),
        magnitude: Some(MAX_PLAUSIBLE_MAGNITUDE + 0.1),
        latitude: Some(42.0),
        longitude: Some(13.0),
        place: Some("Nowhere".to_string()),
    };

    assert!(matches!(
        normalize(&raw),
        Err(NormalizeError::OutOfRange { field: "magnitude", .. })
    ));
}

#[test]
fn test_normalize_missing_time() {
    let raw = RawEvent {
        origin_time: None,
        magnitude: Some(2.0),
        latitude: Some(42.0),
        longitude: Some(13.0),
        place: None,
    };

    assert_eq!(normalize(&raw), Err(NormalizeError::MissingField("time")));
}
