//! # Tuneseek Performance Benchmarks
//!
//! ## Benchmark Categories
//!
//! - **Snapshot Build**: normalization fit plus per-song normalize/classify
//! - **Similarity**: exhaustive nearest-neighbour scans
//! - **Recommendation**: full queries through the pipeline
//! - **Catalog Loading**: CSV parsing
//! - **Title Resolution**: substring and fuzzy title lookups
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench similarity
//! cargo bench recommendation
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::fmt::Write as _;
use std::hint::black_box;
use tempfile::TempDir;
use tuneseek::catalog::FEATURE_COUNT;
use tuneseek::recommend::Snapshot;
use tuneseek::similarity::{nearest_neighbors, Candidate};
use tuneseek::{Catalog, CatalogSource, EngineConfig, Filters, Metric, Mood, Recommender, Scaling, Song};

const GENRES: [&str; 6] = ["pop", "rock", "rap", "edm", "latin", "r&b"];

/// Deterministic pseudo-random value in 0..1
fn wobble(i: usize, salt: usize) -> f64 {
    ((i * 7919 + salt * 104_729) % 1000) as f64 / 1000.0
}

/// Helper function to create a synthetic catalog
fn create_test_songs(count: usize) -> Vec<Song> {
    (0..count)
        .map(|i| {
            let mut features = [0.0; FEATURE_COUNT];
            for (salt, value) in features.iter_mut().enumerate() {
                *value = wobble(i, salt);
            }
            features[1] = 60.0 + 120.0 * wobble(i, 11);
            features[3] = -30.0 + 30.0 * wobble(i, 13);

            Song {
                id: format!("track{i:05}"),
                title: format!("Song {i:05}"),
                artist: format!("Artist {}", i / 20 + 1),
                album: format!("Album {}", i / 10 + 1),
                genre: GENRES[i % GENRES.len()].to_string(),
                popularity: (i % 101) as f64,
                duration_ms: Some(180_000 + (i as u64 % 60) * 1000),
                features,
            }
        })
        .collect()
}

fn create_test_catalog(count: usize) -> Catalog {
    Catalog::from_songs(create_test_songs(count)).expect("valid synthetic catalog")
}

/// Benchmark building snapshots (normalize + classify every song)
fn benchmark_snapshot_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_build");

    for size in [100, 1000, 10_000].iter() {
        let catalog = create_test_catalog(*size);
        for scaling in [Scaling::MinMax, Scaling::Standard] {
            let config = EngineConfig {
                scaling,
                ..EngineConfig::default()
            };
            group.bench_with_input(BenchmarkId::new(scaling.to_string(), size), &catalog, |b, catalog| {
                b.iter_batched(
                    || catalog.clone(),
                    |catalog| Snapshot::build(black_box(catalog), config),
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

/// Benchmark raw nearest-neighbour scans
fn benchmark_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    for size in [1000, 10_000].iter() {
        let snapshot = Snapshot::build(create_test_catalog(*size), EngineConfig::default())
            .expect("snapshot builds");
        let details = snapshot.song_details("track00000").expect("reference exists");
        let vectors: Vec<_> = snapshot
            .catalog()
            .all_songs()
            .map(|song| snapshot.song_details(&song.id).expect("song exists").normalized)
            .collect();

        for metric in [Metric::Euclidean, Metric::Cosine] {
            group.bench_with_input(BenchmarkId::new(metric.to_string(), size), &vectors, |b, vectors| {
                b.iter(|| {
                    let candidates = snapshot
                        .catalog()
                        .all_songs()
                        .zip(vectors)
                        .enumerate()
                        .map(|(index, (song, vector))| Candidate { index, song, vector });
                    nearest_neighbors(
                        black_box(details.normalized.as_slice()),
                        candidates,
                        Some("track00000"),
                        10,
                        metric,
                    )
                    .map(|neighbors| neighbors.len())
                })
            });
        }
    }

    group.finish();
}

/// Benchmark full recommendation queries
fn benchmark_recommendation(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommendation");
    let recommender =
        Recommender::from_catalog(create_test_catalog(10_000), EngineConfig::default()).expect("recommender builds");

    group.bench_function("by_song_unfiltered", |b| {
        b.iter(|| recommender.recommend_by_song(black_box("track00042"), Filters::default(), None))
    });

    let filters = Filters::default().with_genre("pop").with_mood(Mood::Happy);
    group.bench_function("by_song_filtered", |b| {
        b.iter(|| recommender.recommend_by_song(black_box("track00042"), filters.clone(), None))
    });

    group.bench_function("by_filters_popularity", |b| {
        b.iter(|| recommender.recommend_by_filters(black_box(filters.clone()).with_min_popularity(50.0), Some(20)))
    });

    let raw = create_test_songs(1)[0].features;
    group.bench_function("by_features", |b| {
        b.iter(|| recommender.recommend_by_features(black_box(&raw), Filters::default(), None))
    });

    group.finish();
}

/// Benchmark CSV catalog loading
fn benchmark_catalog_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_loading");
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for size in [1000, 10_000].iter() {
        let path = temp_dir.path().join(format!("catalog_{size}.csv"));
        let mut content = String::from(
            "id,title,artist,album,genre,popularity,duration_ms,\
             energy,tempo,danceability,loudness,liveness,valence,speechiness,acousticness\n",
        );
        for song in create_test_songs(*size) {
            let _ = write!(
                content,
                "{},{},{},{},{},{},{}",
                song.id,
                song.title,
                song.artist,
                song.album,
                song.genre,
                song.popularity,
                song.duration_ms.unwrap_or_default()
            );
            for value in song.features {
                let _ = write!(content, ",{value}");
            }
            content.push('\n');
        }
        std::fs::write(&path, content).expect("Failed to write catalog");

        let source = CatalogSource::from_path(&path);
        group.bench_with_input(BenchmarkId::new("csv", size), &source, |b, source| {
            b.iter(|| Catalog::load(black_box(source)).map(|catalog| catalog.len()))
        });
    }

    group.finish();
}

/// Benchmark title resolution
fn benchmark_title_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("title_resolution");
    let catalog = create_test_catalog(10_000);

    group.bench_function("exact", |b| b.iter(|| catalog.resolve_title(black_box("Song 09999")).is_ok()));
    group.bench_function("artist", |b| b.iter(|| catalog.resolve_title(black_box("artist 77")).is_ok()));
    group.bench_function("fuzzy", |b| b.iter(|| catalog.resolve_title(black_box("Sogn 0999x")).is_ok()));
    group.bench_function("search", |b| b.iter(|| catalog.search(black_box("album 12"), 10).len()));

    group.finish();
}

// Group all benchmarks
criterion_group!(
    benches,
    benchmark_snapshot_build,
    benchmark_similarity,
    benchmark_recommendation,
    benchmark_catalog_loading,
    benchmark_title_resolution
);

criterion_main!(benches);
