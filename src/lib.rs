//! Song recommendations from audio features, mood and genre.
//!
//! Core modules:
//! - [`catalog`] - Song records, CSV/SQLite loading, lookup and title search
//! - [`normalize`] - Per-feature scaling fitted on the catalog
//! - [`classify`] - Mood from normalized energy and valence; genre lookup
//! - [`similarity`] - Distance metrics and nearest-neighbour ranking
//! - [`recommend`] - Filtering, ranking and the reloadable [`Recommender`]
//!
//! ### Supporting Modules
//!
//! - [`config`] - Data directory and engine settings
//! - [`error`] - [`RecommendError`], the engine's error type
//! - [`cli`] - Command-line interface definitions
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use tuneseek::{CatalogSource, EngineConfig, Filters, Mood, Recommender};
//!
//! let source = CatalogSource::from_path("spotify_songs.csv");
//! let recommender = Recommender::load(&source, EngineConfig::default())?;
//!
//! // Happy pop songs, most popular first
//! let filters = Filters::default().with_genre("pop").with_mood(Mood::Happy);
//! let top = recommender.recommend_by_filters(filters, Some(5))?;
//!
//! // Songs that sound like the first of them
//! if let Some(first) = top.iter().next() {
//!     let similar = recommender.recommend_by_song(&first.song.id, Filters::default(), None)?;
//!     for entry in similar.iter() {
//!         println!("{} - {} ({:.3})", entry.song.title, entry.song.artist, entry.score);
//!     }
//! }
//! # Ok::<(), tuneseek::RecommendError>(())
//! ```
//!
//! ## How Ranking Works
//!
//! Every feature column is rescaled once at load time (min-max by default, or z-score),
//! so tempo in BPM and loudness in dB weigh the same as 0..1 features. Moods come from
//! the normalized energy and valence of each song:
//!
//! | energy | valence  | mood      |
//! |--------|----------|-----------|
//! | high   | positive | Happy     |
//! | high   | negative | Energetic |
//! | low    | positive | Calm      |
//! | low    | negative | Sad       |
//!
//! A query first drops every song failing a filter, then ranks the rest by distance to
//! the reference (Euclidean or cosine) or, with no reference, by popularity.

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod normalize;
pub mod recommend;
pub mod similarity;

pub use catalog::{Catalog, CatalogSource, Feature, Song};
pub use classify::Mood;
pub use config::EngineConfig;
pub use error::RecommendError;
pub use normalize::Scaling;
pub use recommend::{Filters, Query, Recommendation, Recommender};
pub use similarity::Metric;
