// Criterion benchmarks for Quake Watch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quake_watch::core::{distance::haversine_distance, GeoBoundingBox, MunicipalityIndex};
use quake_watch::models::Municipality;

fn create_municipalities(count: usize) -> Vec<Municipality> {
    (0..count)
        .map(|i| Municipality {
            name: format!("Comune {}", i),
            latitude: 36.0 + (i as f64 * 0.0137) % 11.0,
            longitude: 6.5 + (i as f64 * 0.0291) % 12.0,
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(42.8303),
                black_box(13.1092),
                black_box(45.4064),
                black_box(11.8768),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    let bbox = GeoBoundingBox::italy();

    c.bench_function("bounding_box_contains", |b| {
        b.iter(|| bbox.contains(black_box(42.8303), black_box(13.1092)));
    });
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_municipalities");

    for count in [100, 500, 1000, 8000].iter() {
        let index = MunicipalityIndex::new(create_municipalities(*count));

        group.bench_with_input(BenchmarkId::new("nearest_5", count), count, |b, _| {
            b.iter(|| {
                index
                    .nearest(black_box(42.8303), black_box(13.1092), black_box(5))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_nearest
);
criterion_main!(benches);
