//! # Catalog Store
//!
//! Holds the immutable table of songs and their raw feature vectors. A catalog is read
//! once from a CSV file or a SQLite database and never mutated afterwards; the engine
//! derives everything else (normalized vectors, moods) from it.
//!
//! ## Schema
//!
//! Required columns are `id`, `title`, `artist`, `genre`, `popularity` and every
//! [`Feature`]. `album` and `duration_ms` are optional. The column names used by the
//! common Spotify dataset export (`track_name`, `playlist_genre`, ...) are accepted as
//! aliases so that file loads unchanged.
//!
//! Any missing column or bad value fails the whole load. There is no partial catalog.

use crate::error::{RecommendError, Result};
use log::{debug, info, trace};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of audio features in every vector.
pub const FEATURE_COUNT: usize = 8;

/// Upper bound of the popularity scale.
pub const MAX_POPULARITY: f64 = 100.0;

/// Minimum title similarity for a fuzzy match in [`Catalog::resolve_title`].
pub const FUZZY_CUTOFF: f64 = 0.6;

/// Titles offered when [`Catalog::resolve_title`] finds nothing.
pub const SUGGESTION_COUNT: usize = 3;

/// Audio features, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Energy,
    Tempo,
    Danceability,
    Loudness,
    Liveness,
    Valence,
    Speechiness,
    Acousticness,
}

impl Feature {
    /// Every feature in vector order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Energy,
        Feature::Tempo,
        Feature::Danceability,
        Feature::Loudness,
        Feature::Liveness,
        Feature::Valence,
        Feature::Speechiness,
        Feature::Acousticness,
    ];

    /// Column name in catalog files.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Feature::Energy => "energy",
            Feature::Tempo => "tempo",
            Feature::Danceability => "danceability",
            Feature::Loudness => "loudness",
            Feature::Liveness => "liveness",
            Feature::Valence => "valence",
            Feature::Speechiness => "speechiness",
            Feature::Acousticness => "acousticness",
        }
    }

    /// Position of this feature inside a vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Raw audio features of one song, ordered as [`Feature::ALL`].
pub type RawFeatures = [f64; FEATURE_COUNT];

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Empty when the catalog has no album column
    pub album: String,
    pub genre: String,
    /// 0 to 100
    pub popularity: f64,
    pub duration_ms: Option<u64>,
    pub features: RawFeatures,
}

impl Song {
    /// Value of a single raw feature.
    #[must_use]
    pub fn feature(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }
}

/// Where a catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Comma separated file with a header row
    Csv(PathBuf),
    /// SQLite database with a `songs` table
    Sqlite(PathBuf),
}

impl CatalogSource {
    /// Pick the source kind from the file extension. `.db`, `.sqlite` and `.sqlite3` are
    /// SQLite databases, anything else is read as CSV.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_sqlite = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "db" | "sqlite" | "sqlite3"))
            .unwrap_or(false);

        if is_sqlite {
            Self::Sqlite(path)
        } else {
            Self::Csv(path)
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Csv(path) | Self::Sqlite(path) => path,
        }
    }
}

/// Immutable song table with lookup by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    songs: Vec<Song>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Read a complete catalog from `source`.
    ///
    /// # Errors
    ///
    /// [`RecommendError::Data`] if the file cannot be read, a required column is missing,
    /// a value is malformed, an id repeats, or there are no songs.
    pub fn load(source: &CatalogSource) -> Result<Self> {
        info!("Loading catalog from {}", source.path().display());

        let songs = match source {
            CatalogSource::Csv(path) => read_csv(path)?,
            CatalogSource::Sqlite(path) => read_sqlite(path)?,
        };

        let catalog = Self::from_songs(songs)?;
        info!("Loaded {} songs", catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from songs that are already in memory.
    ///
    /// # Errors
    ///
    /// [`RecommendError::Data`] on an empty list, a duplicate id, a non-finite feature or
    /// a popularity outside 0..=100.
    pub fn from_songs(songs: Vec<Song>) -> Result<Self> {
        if songs.is_empty() {
            return Err(RecommendError::Data("catalog contains no songs".to_string()));
        }

        let mut by_id = HashMap::with_capacity(songs.len());
        for (index, song) in songs.iter().enumerate() {
            validate_song(song)?;
            if by_id.insert(song.id.clone(), index).is_some() {
                return Err(RecommendError::Data(format!("duplicate song id `{}`", song.id)));
            }
        }

        Ok(Self { songs, by_id })
    }

    /// # Errors
    ///
    /// [`RecommendError::NotFound`] if no song has this id.
    pub fn lookup_by_id(&self, id: &str) -> Result<&Song> {
        self.position(id)
            .map(|index| &self.songs[index])
            .ok_or_else(|| RecommendError::not_found(id))
    }

    /// Load-order index of a song.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Every song in load order.
    pub fn all_songs(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }

    #[must_use]
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Genres with their song counts, sorted by genre name.
    #[must_use]
    pub fn genre_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for song in &self.songs {
            *counts.entry(song.genre.as_str()).or_default() += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(genre, count)| (genre.to_string(), count))
            .collect();
        counts.sort_by(|(a, _), (b, _)| a.cmp(b));
        counts
    }

    /// Songs whose title, artist or album contains `query`, ignoring case.
    /// Load order, at most `limit` results. Repeated title/artist pairs (the same track
    /// listed under several playlists) appear once.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Song> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.songs
            .iter()
            .filter(|song| {
                song.title.to_lowercase().contains(&needle)
                    || song.artist.to_lowercase().contains(&needle)
                    || song.album.to_lowercase().contains(&needle)
            })
            .filter(|song| seen.insert((song.title.to_lowercase(), song.artist.to_lowercase())))
            .take(limit)
            .collect()
    }

    /// Find a song by (approximate) title.
    ///
    /// Tries, in order: exact title, title substring, artist substring, closest title by
    /// normalized edit distance. All comparisons ignore case. The first song in load order
    /// wins within a step.
    ///
    /// # Errors
    ///
    /// [`RecommendError::NotFound`] with up to three close titles as suggestions.
    pub fn resolve_title(&self, name: &str) -> Result<&Song> {
        let needle = name.trim().to_lowercase();
        debug!("Resolving title `{needle}`");

        if needle.is_empty() {
            return Err(RecommendError::InvalidQuery("song name is empty".to_string()));
        }

        let steps: [&dyn Fn(&Song) -> bool; 3] = [
            &|song: &Song| song.title.to_lowercase() == needle,
            &|song: &Song| song.title.to_lowercase().contains(&needle),
            &|song: &Song| song.artist.to_lowercase().contains(&needle),
        ];
        for (step, matches) in steps.iter().enumerate() {
            if let Some(song) = self.songs.iter().find(|song| matches(song)) {
                trace!("Title step {step} matched `{}`", song.title);
                return Ok(song);
            }
        }

        let ranked = self.ranked_titles(&needle);
        if let Some(&(song, score)) = ranked.first() {
            if score >= FUZZY_CUTOFF {
                debug!("Fuzzy title match `{}` ({score:.2})", song.title);
                return Ok(song);
            }
        }

        // nothing close enough to pick, so offer the nearest titles instead
        Err(RecommendError::NotFound {
            key: name.to_string(),
            suggestions: ranked
                .into_iter()
                .filter(|(_, score)| *score > 0.0)
                .take(SUGGESTION_COUNT)
                .map(|(song, _)| song.title.clone())
                .collect(),
        })
    }

    /// One song per distinct title (first in load order) with its similarity to
    /// `needle`, best first.
    fn ranked_titles(&self, needle: &str) -> Vec<(&Song, f64)> {
        let mut seen = HashSet::new();
        let mut scored: Vec<(&Song, f64)> = self
            .songs
            .iter()
            .filter(|song| seen.insert(song.title.to_lowercase()))
            .map(|song| (song, strsim::normalized_levenshtein(needle, &song.title.to_lowercase())))
            .collect();

        // stable: equal scores keep load order
        scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        scored
    }
}

fn validate_song(song: &Song) -> Result<()> {
    if song.id.trim().is_empty() {
        return Err(RecommendError::Data("song with empty id".to_string()));
    }
    if !song.popularity.is_finite() || !(0.0..=MAX_POPULARITY).contains(&song.popularity) {
        return Err(RecommendError::Data(format!(
            "song `{}`: popularity {} outside 0..={MAX_POPULARITY}",
            song.id, song.popularity
        )));
    }
    for feature in Feature::ALL {
        let value = song.feature(feature);
        if !value.is_finite() {
            return Err(RecommendError::Data(format!(
                "song `{}`: {feature} is not a finite number ({value})",
                song.id
            )));
        }
    }
    Ok(())
}

/// Column positions resolved from a header row.
#[derive(Debug)]
struct ColumnMap {
    id: usize,
    title: usize,
    artist: usize,
    genre: usize,
    popularity: usize,
    album: Option<usize>,
    duration_ms: Option<usize>,
    features: [usize; FEATURE_COUNT],
}

/// Canonical column name for a header, folding dataset aliases.
fn canonical_column(header: &str) -> String {
    let header = header.trim().to_ascii_lowercase();
    match header.as_str() {
        "track_id" => "id".to_string(),
        "track_name" => "title".to_string(),
        "track_artist" => "artist".to_string(),
        "track_album_name" => "album".to_string(),
        "playlist_genre" => "genre".to_string(),
        "track_popularity" => "popularity".to_string(),
        _ => header,
    }
}

impl ColumnMap {
    fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (index, header) in headers.into_iter().enumerate() {
            // first occurrence wins when a file carries both a name and its alias
            positions.entry(canonical_column(header)).or_insert(index);
        }

        let mut missing = Vec::new();
        let mut required = |name: &str| -> usize {
            positions.get(name).copied().unwrap_or_else(|| {
                missing.push(name.to_string());
                0
            })
        };

        let id = required("id");
        let title = required("title");
        let artist = required("artist");
        let genre = required("genre");
        let popularity = required("popularity");
        let mut features = [0; FEATURE_COUNT];
        for feature in Feature::ALL {
            features[feature.index()] = required(feature.column());
        }

        if !missing.is_empty() {
            return Err(RecommendError::Data(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            id,
            title,
            artist,
            genre,
            popularity,
            album: positions.get("album").copied(),
            duration_ms: positions.get("duration_ms").copied(),
            features,
        })
    }

    /// Turn one row of cell values into a song. `row` is a 1-based line for messages.
    fn parse_row<'a>(&self, cell: impl Fn(usize) -> Option<&'a str>, row: u64) -> Result<Song> {
        let text = |index: usize| cell(index).unwrap_or("").trim().to_string();
        let number = |index: usize, column: &str| -> Result<f64> {
            let raw = cell(index).unwrap_or("").trim();
            raw.parse::<f64>().map_err(|_| {
                RecommendError::Data(format!("row {row}: column `{column}` is not numeric: `{raw}`"))
            })
        };

        let mut features = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            features[feature.index()] = number(self.features[feature.index()], feature.column())?;
        }

        let duration_ms = match self.duration_ms.and_then(&cell).map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<f64>().map(|ms| ms.max(0.0).round() as u64).map_err(
                |_| RecommendError::Data(format!("row {row}: column `duration_ms` is not numeric: `{raw}`")),
            )?),
        };

        Ok(Song {
            id: text(self.id),
            title: text(self.title),
            artist: text(self.artist),
            album: self.album.map(|index| text(index)).unwrap_or_default(),
            genre: text(self.genre),
            popularity: number(self.popularity, "popularity")?,
            duration_ms,
            features,
        })
    }
}

fn read_csv(path: &Path) -> Result<Vec<Song>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| RecommendError::Data(format!("cannot open {}: {e}", path.display())))?;

    let columns = ColumnMap::resolve(reader.headers()?.iter())?;
    debug!("Resolved CSV columns: {columns:?}");

    let mut songs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record.position().map_or(0, csv::Position::line);
        songs.push(columns.parse_row(|index| record.get(index), row)?);
    }
    Ok(songs)
}

fn read_sqlite(path: &Path) -> Result<Vec<Song>> {
    // no implicit database creation for a mistyped path
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| RecommendError::Data(format!("cannot open {}: {e}", path.display())))?;

    let mut stmt = conn.prepare("SELECT * FROM songs")?;
    let names: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let columns = ColumnMap::resolve(names.iter().map(String::as_str))?;
    debug!("Resolved SQLite columns: {columns:?}");

    let mut rows = stmt.query([])?;
    let mut songs = Vec::new();
    let mut row_number = 0_u64;
    while let Some(row) = rows.next()? {
        row_number += 1;
        let cells = (0..names.len())
            .map(|index| row.get_ref(index).map(cell_text))
            .collect::<std::result::Result<Vec<String>, _>>()?;
        songs.push(columns.parse_row(|index| cells.get(index).map(String::as_str), row_number)?);
    }
    Ok(songs)
}

/// Text form of a SQLite cell, so both sources share one row parser.
fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
