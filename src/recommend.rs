//! # Recommendation Pipeline
//!
//! Turns a [`Query`] into an ordered [`Recommendation`].
//!
//! 1. **Candidates**: every song passing all given filters (genre, mood, popularity).
//!    No filters means the whole catalog.
//! 2. **Ranking**: with a reference (a catalog song or a raw feature vector) candidates
//!    are ranked by similarity, the reference song itself left out. Without one they are
//!    ranked by popularity, highest first.
//! 3. **Truncation** to the requested count.
//!
//! An empty candidate set is a valid, empty result.
//!
//! ## Snapshots
//!
//! Everything a query reads (catalog, normalization parameters, normalized vectors,
//! moods) lives in one immutable [`Snapshot`]. A [`Recommender`] holds the current
//! snapshot behind an [`ArcSwap`]: queries grab one `Arc` and use only it, and a reload
//! builds a complete new snapshot before swapping it in.

use crate::catalog::{Catalog, CatalogSource, Song};
use crate::classify::{classify_mood, genre_of, Mood, MoodThresholds};
use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};
use crate::normalize::{NormalizationParams, NormalizedVector};
use crate::similarity::{nearest_neighbors, Candidate, Metric};
use arc_swap::ArcSwap;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Hard filters. All given filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    /// Genre tag, compared ignoring ASCII case
    pub genre: Option<String>,
    pub mood: Option<Mood>,
    /// Inclusive lower bound
    pub min_popularity: Option<f64>,
}

impl Filters {
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    #[must_use]
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    #[must_use]
    pub fn with_min_popularity(mut self, min_popularity: f64) -> Self {
        self.min_popularity = Some(min_popularity);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.mood.is_none() && self.min_popularity.is_none()
    }

    /// # Errors
    ///
    /// [`RecommendError::InvalidQuery`] for a blank genre or a popularity bound outside
    /// 0..=100.
    pub fn validate(&self) -> Result<()> {
        if let Some(genre) = &self.genre {
            if genre.trim().is_empty() {
                return Err(RecommendError::InvalidQuery("genre filter is empty".to_string()));
            }
        }
        if let Some(min) = self.min_popularity {
            if !min.is_finite() || !(0.0..=crate::catalog::MAX_POPULARITY).contains(&min) {
                return Err(RecommendError::InvalidQuery(format!(
                    "minimum popularity {min} outside 0..=100"
                )));
            }
        }
        Ok(())
    }

    /// Conjunction of every filter that is set.
    #[must_use]
    pub fn matches(&self, song: &Song, mood: Mood) -> bool {
        let genre_ok = self
            .genre
            .as_deref()
            .map_or(true, |genre| genre_of(song).eq_ignore_ascii_case(genre.trim()));
        let mood_ok = self.mood.map_or(true, |wanted| wanted == mood);
        let popularity_ok = self.min_popularity.map_or(true, |min| song.popularity >= min);

        genre_ok && mood_ok && popularity_ok
    }
}

/// What the results are ranked against.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Rank by popularity
    None,
    /// Rank by similarity to a catalog song, which is left out of the results
    Song(String),
    /// Rank by similarity to an external raw feature vector
    Features(Vec<f64>),
}

/// One recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub reference: Reference,
    pub filters: Filters,
    /// `None` means the engine default
    pub count: Option<usize>,
}

impl Query {
    pub fn by_song(song_id: impl Into<String>) -> Self {
        Self {
            reference: Reference::Song(song_id.into()),
            filters: Filters::default(),
            count: None,
        }
    }

    #[must_use]
    pub fn by_filters(filters: Filters) -> Self {
        Self {
            reference: Reference::None,
            filters,
            count: None,
        }
    }

    #[must_use]
    pub fn by_features(values: Vec<f64>) -> Self {
        Self {
            reference: Reference::Features(values),
            filters: Filters::default(),
            count: None,
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// One ranked song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedSong {
    pub song: Song,
    pub mood: Mood,
    /// Higher is better; similarity or popularity
    pub score: f64,
    /// Feature-space distance, for similarity rankings
    pub distance: Option<f64>,
}

/// Ranked results, best first. Scores never increase along the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendation {
    pub entries: Vec<RecommendedSong>,
}

impl Recommendation {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecommendedSong> {
        self.entries.iter()
    }

    /// Song ids in result order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.song.id.as_str()).collect()
    }
}

/// Everything known about one song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongDetails {
    pub song: Song,
    pub mood: Mood,
    pub normalized: NormalizedVector,
}

/// Immutable catalog plus everything derived from it.
#[derive(Debug)]
pub struct Snapshot {
    catalog: Catalog,
    params: NormalizationParams,
    vectors: Vec<NormalizedVector>,
    moods: Vec<Mood>,
    config: EngineConfig,
}

impl Snapshot {
    /// Fit normalization, then normalize and classify every song once.
    ///
    /// # Errors
    ///
    /// Only if a catalog vector does not match the feature schema, which a loaded
    /// catalog rules out.
    pub fn build(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        let params = NormalizationParams::fit(&catalog, config.scaling);
        let thresholds = MoodThresholds::for_scaling(config.scaling);

        // order-preserving collect keeps load order
        let derived = catalog
            .songs()
            .par_iter()
            .map(|song| -> Result<(NormalizedVector, Mood)> {
                let vector = params.apply(&song.features)?;
                Ok((vector, classify_mood(&vector, thresholds)))
            })
            .collect::<Result<Vec<_>>>()?;
        let (vectors, moods): (Vec<_>, Vec<_>) = derived.into_iter().unzip();

        for mood in Mood::ALL {
            debug!("{mood}: {} songs", moods.iter().filter(|&&m| m == mood).count());
        }
        info!(
            "Built snapshot of {} songs ({} scaling, {} distance)",
            catalog.len(),
            config.scaling,
            config.metric
        );

        Ok(Self {
            catalog,
            params,
            vectors,
            moods,
            config,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    /// # Errors
    ///
    /// [`RecommendError::NotFound`] for an unknown id.
    pub fn mood_of(&self, id: &str) -> Result<Mood> {
        self.catalog
            .position(id)
            .map(|index| self.moods[index])
            .ok_or_else(|| RecommendError::not_found(id))
    }

    /// # Errors
    ///
    /// [`RecommendError::NotFound`] for an unknown id.
    pub fn song_details(&self, id: &str) -> Result<SongDetails> {
        let index = self.catalog.position(id).ok_or_else(|| RecommendError::not_found(id))?;
        Ok(SongDetails {
            song: self.catalog.songs()[index].clone(),
            mood: self.moods[index],
            normalized: self.vectors[index],
        })
    }

    /// Songs passing `filters`, in load order.
    fn candidates<'a>(&'a self, filters: &'a Filters) -> impl Iterator<Item = Candidate<'a>> + 'a {
        self.catalog
            .all_songs()
            .enumerate()
            .filter(move |(index, song)| filters.matches(song, self.moods[*index]))
            .map(move |(index, song)| Candidate {
                index,
                song,
                vector: &self.vectors[index],
            })
    }

    fn resolve_count(&self, count: Option<usize>) -> Result<usize> {
        match count {
            Some(0) => Err(RecommendError::InvalidQuery("result count must be at least 1".to_string())),
            Some(count) => Ok(count),
            None => Ok(self.config.default_count),
        }
    }

    fn entry(&self, index: usize, score: f64, distance: Option<f64>) -> RecommendedSong {
        RecommendedSong {
            song: self.catalog.songs()[index].clone(),
            mood: self.moods[index],
            score,
            distance,
        }
    }

    /// Run the pipeline against this snapshot.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::NotFound`] if the reference song is not in the catalog
    /// - [`RecommendError::InvalidQuery`] for bad filters, a zero count or a feature
    ///   vector of the wrong length
    pub fn recommend(&self, query: &Query) -> Result<Recommendation> {
        query.filters.validate()?;
        let count = self.resolve_count(query.count)?;
        debug!("Query {:?} with {:?}, count {count}", query.reference, query.filters);

        let (reference, exclude_id) = match &query.reference {
            Reference::None => (None, None),
            Reference::Song(id) => {
                let index = self.catalog.position(id).ok_or_else(|| RecommendError::not_found(id))?;
                (Some(self.vectors[index]), Some(id.as_str()))
            }
            Reference::Features(values) => (Some(self.params.apply(values)?), None),
        };

        let candidates = self.candidates(&query.filters);
        let entries: Vec<RecommendedSong> = match reference {
            Some(vector) => {
                let metric = self.metric();
                nearest_neighbors(vector.as_slice(), candidates, exclude_id, count, metric)?
                    .into_iter()
                    .map(|n| self.entry(n.index, metric.score(n.distance), Some(n.distance)))
                    .collect()
            }
            None => {
                let mut ranked: Vec<Candidate<'_>> = candidates.collect();
                // stable: equal popularity stays in load order
                ranked.sort_by(|a, b| b.song.popularity.total_cmp(&a.song.popularity));
                ranked
                    .into_iter()
                    .take(count)
                    .map(|c| self.entry(c.index, c.song.popularity, None))
                    .collect()
            }
        };

        debug!("Returning {} songs", entries.len());
        Ok(Recommendation { entries })
    }

    /// Up to `count` random songs passing `filters`, drawn without replacement and then
    /// ordered by popularity.
    ///
    /// # Errors
    ///
    /// [`RecommendError::InvalidQuery`] for bad filters or a zero count.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        filters: &Filters,
        count: Option<usize>,
        rng: &mut R,
    ) -> Result<Recommendation> {
        filters.validate()?;
        let count = self.resolve_count(count)?;

        let pool: Vec<Candidate<'_>> = self.candidates(filters).collect();
        let mut picked: Vec<&Candidate<'_>> = pool.choose_multiple(rng, count).collect();
        picked.sort_by(|a, b| b.song.popularity.total_cmp(&a.song.popularity));

        Ok(Recommendation {
            entries: picked
                .into_iter()
                .map(|c| self.entry(c.index, c.song.popularity, None))
                .collect(),
        })
    }
}

/// Query entry point holding the current [`Snapshot`].
///
/// Cheap to share between threads; all queries are read-only.
#[derive(Debug)]
pub struct Recommender {
    current: ArcSwap<Snapshot>,
    config: EngineConfig,
}

impl Recommender {
    /// Load a catalog and build the first snapshot.
    ///
    /// # Errors
    ///
    /// [`RecommendError::Data`] if the catalog cannot be loaded.
    pub fn load(source: &CatalogSource, config: EngineConfig) -> Result<Self> {
        Self::from_catalog(Catalog::load(source)?, config)
    }

    /// # Errors
    ///
    /// See [`Snapshot::build`].
    pub fn from_catalog(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        let snapshot = Snapshot::build(catalog, config)?;
        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
            config,
        })
    }

    /// The snapshot queries currently see.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Load `source` into a fresh snapshot and swap it in. On error the current snapshot
    /// stays.
    ///
    /// # Errors
    ///
    /// [`RecommendError::Data`] if the catalog cannot be loaded.
    pub fn reload(&self, source: &CatalogSource) -> Result<()> {
        self.replace_catalog(Catalog::load(source)?)
    }

    /// # Errors
    ///
    /// See [`Snapshot::build`].
    pub fn replace_catalog(&self, catalog: Catalog) -> Result<()> {
        let snapshot = Snapshot::build(catalog, self.config)?;
        self.current.store(Arc::new(snapshot));
        info!("Swapped in new catalog snapshot");
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Snapshot::recommend`].
    pub fn recommend(&self, query: &Query) -> Result<Recommendation> {
        self.current.load().recommend(query)
    }

    /// Songs similar to a catalog song.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::recommend`].
    pub fn recommend_by_song(&self, song_id: &str, filters: Filters, count: Option<usize>) -> Result<Recommendation> {
        self.recommend(&Query {
            reference: Reference::Song(song_id.to_string()),
            filters,
            count,
        })
    }

    /// Most popular songs passing `filters`.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::recommend`].
    pub fn recommend_by_filters(&self, filters: Filters, count: Option<usize>) -> Result<Recommendation> {
        self.recommend(&Query {
            reference: Reference::None,
            filters,
            count,
        })
    }

    /// Songs similar to a raw feature vector (same order and units as the catalog).
    ///
    /// # Errors
    ///
    /// See [`Snapshot::recommend`].
    pub fn recommend_by_features(
        &self,
        values: &[f64],
        filters: Filters,
        count: Option<usize>,
    ) -> Result<Recommendation> {
        self.recommend(&Query {
            reference: Reference::Features(values.to_vec()),
            filters,
            count,
        })
    }

    /// Resolve a title like [`Catalog::resolve_title`], then recommend by that song.
    /// Returns the resolved song alongside the results.
    ///
    /// # Errors
    ///
    /// [`RecommendError::NotFound`] with suggestions when the title does not resolve,
    /// otherwise see [`Snapshot::recommend`].
    pub fn recommend_by_title(
        &self,
        name: &str,
        filters: Filters,
        count: Option<usize>,
    ) -> Result<(Song, Recommendation)> {
        // one snapshot for both steps
        let snapshot = self.current.load();
        let song = snapshot.catalog().resolve_title(name)?.clone();
        let recommendation = snapshot.recommend(&Query {
            reference: Reference::Song(song.id.clone()),
            filters,
            count,
        })?;
        Ok((song, recommendation))
    }

    /// # Errors
    ///
    /// [`RecommendError::NotFound`] for an unknown id.
    pub fn song_details(&self, song_id: &str) -> Result<SongDetails> {
        self.current.load().song_details(song_id)
    }

    /// # Errors
    ///
    /// See [`Snapshot::sample`].
    pub fn sample<R: Rng + ?Sized>(&self, filters: &Filters, count: Option<usize>, rng: &mut R) -> Result<Recommendation> {
        self.current.load().sample(filters, count, rng)
    }

    /// Text search over title, artist and album, capped at the configured limit.
    #[must_use]
    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<Song> {
        let snapshot = self.current.load();
        let limit = limit.unwrap_or(snapshot.config().search_limit);
        snapshot
            .catalog()
            .search(query, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn genre_counts(&self) -> Vec<(String, usize)> {
        self.current.load().catalog().genre_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Feature, FEATURE_COUNT};
    use crate::normalize::Scaling;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn song(id: &str, genre: &str, popularity: f64, energy: f64, valence: f64) -> Song {
        let mut features = [0.5; FEATURE_COUNT];
        features[Feature::Energy.index()] = energy;
        features[Feature::Valence.index()] = valence;
        features[Feature::Tempo.index()] = 60.0 + energy * 120.0;
        Song {
            id: id.to_string(),
            title: format!("Song {id}"),
            artist: format!("Artist {id}"),
            album: String::new(),
            genre: genre.to_string(),
            popularity,
            duration_ms: Some(200_000),
            features,
        }
    }

    fn recommender() -> Recommender {
        let catalog = Catalog::from_songs(vec![
            song("1", "Pop", 80.0, 0.9, 0.9),
            song("2", "Rock", 40.0, 0.1, 0.2),
            song("3", "pop", 55.0, 0.8, 0.7),
            song("4", "Pop", 30.0, 0.2, 0.8),
            song("5", "Jazz", 55.0, 0.0, 0.0),
            song("6", "rock", 90.0, 1.0, 0.1),
        ])
        .unwrap();
        Recommender::from_catalog(catalog, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_moods_cached_per_song() {
        let rec = recommender();
        let snapshot = rec.snapshot();
        assert_eq!(snapshot.mood_of("1").unwrap(), Mood::Happy);
        assert_eq!(snapshot.mood_of("5").unwrap(), Mood::Sad);
        assert_eq!(snapshot.mood_of("6").unwrap(), Mood::Energetic);
        assert_eq!(snapshot.mood_of("4").unwrap(), Mood::Calm);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let rec = recommender();
        let filters = Filters::default().with_genre("Pop").with_min_popularity(50.0);
        let result = rec.recommend_by_filters(filters, Some(10)).unwrap();

        assert_eq!(result.ids(), ["1", "3"]);
        for entry in result.iter() {
            assert!(entry.song.genre.eq_ignore_ascii_case("pop"));
            assert!(entry.song.popularity >= 50.0);
        }
    }

    #[test]
    fn test_popularity_order_ties_in_load_order() {
        let rec = recommender();
        let result = rec.recommend_by_filters(Filters::default(), None).unwrap();
        assert_eq!(result.ids(), ["6", "1", "3", "5", "2", "4"]);
        assert!(result.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_mood_filter() {
        let rec = recommender();
        let result = rec
            .recommend_by_filters(Filters::default().with_mood(Mood::Happy), None)
            .unwrap();
        assert_eq!(result.ids(), ["1", "3"]);
    }

    #[test]
    fn test_by_song_excludes_reference_and_orders_scores() {
        let rec = recommender();
        let result = rec.recommend_by_song("1", Filters::default(), Some(3)).unwrap();

        assert_eq!(result.len(), 3);
        assert!(!result.ids().contains(&"1"));
        assert_eq!(result.ids()[0], "3");
        assert!(result.entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(result
            .entries
            .windows(2)
            .all(|w| w[0].distance.unwrap() <= w[1].distance.unwrap()));
    }

    #[test]
    fn test_by_song_with_filters() {
        let rec = recommender();
        let result = rec
            .recommend_by_song("1", Filters::default().with_genre("rock"), None)
            .unwrap();
        let mut ids = result.ids();
        ids.sort_unstable();
        assert_eq!(ids, ["2", "6"]);
    }

    #[test]
    fn test_unknown_reference_is_not_found() {
        let rec = recommender();
        let err = rec.recommend_by_song("nope", Filters::default(), Some(5)).unwrap_err();
        assert_eq!(err, RecommendError::not_found("nope"));
    }

    #[test]
    fn test_empty_candidates_is_empty_result() {
        let rec = recommender();
        let filters = Filters::default().with_genre("Metal");
        assert!(rec.recommend_by_filters(filters.clone(), None).unwrap().is_empty());
        assert!(rec.recommend_by_song("1", filters, None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_queries() {
        let rec = recommender();
        let zero = rec.recommend_by_filters(Filters::default(), Some(0));
        assert!(matches!(zero, Err(RecommendError::InvalidQuery(_))));

        let blank = rec.recommend_by_filters(Filters::default().with_genre("  "), None);
        assert!(matches!(blank, Err(RecommendError::InvalidQuery(_))));

        let popularity = rec.recommend_by_filters(Filters::default().with_min_popularity(101.0), None);
        assert!(matches!(popularity, Err(RecommendError::InvalidQuery(_))));

        let nan = rec.recommend_by_filters(Filters::default().with_min_popularity(f64::NAN), None);
        assert!(matches!(nan, Err(RecommendError::InvalidQuery(_))));
    }

    #[test]
    fn test_by_features() {
        let rec = recommender();
        let raw = rec.snapshot().catalog().lookup_by_id("5").unwrap().features;
        let result = rec.recommend_by_features(&raw, Filters::default(), Some(1)).unwrap();
        // nothing is excluded for an external vector
        assert_eq!(result.ids(), ["5"]);
        assert_eq!(result.entries[0].distance, Some(0.0));
        assert_eq!(result.entries[0].score, 1.0);

        let err = rec.recommend_by_features(&[0.1; 3], Filters::default(), None).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidQuery(_)));
    }

    #[test]
    fn test_by_features_rejects_non_finite_values() {
        let catalog = recommender().snapshot().catalog().clone();
        for metric in [Metric::Euclidean, Metric::Cosine] {
            let config = EngineConfig {
                metric,
                ..EngineConfig::default()
            };
            let rec = Recommender::from_catalog(catalog.clone(), config).unwrap();
            for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let mut raw = [0.5; FEATURE_COUNT];
                raw[Feature::Energy.index()] = bad;
                let result = rec.recommend_by_features(&raw, Filters::default(), Some(3));
                assert!(matches!(result, Err(RecommendError::InvalidQuery(_))), "{metric} {bad}");
            }

            // huge but finite values still rank with finite scores
            let mut raw = [0.5; FEATURE_COUNT];
            raw[Feature::Tempo.index()] = f64::MAX;
            let result = rec.recommend_by_features(&raw, Filters::default(), Some(3)).unwrap();
            assert_eq!(result.len(), 3);
            assert!(result.iter().all(|e| e.score.is_finite()), "{metric}");
        }
    }

    #[test]
    fn test_by_title() {
        let rec = recommender();
        let (song, result) = rec.recommend_by_title("song 4", Filters::default(), Some(2)).unwrap();
        assert_eq!(song.id, "4");
        assert!(!result.ids().contains(&"4"));

        let err = rec.recommend_by_title("zzzzzzzz", Filters::default(), None).unwrap_err();
        assert!(matches!(err, RecommendError::NotFound { .. }));
    }

    #[test]
    fn test_sample_is_filtered_and_sorted() {
        let rec = recommender();
        let mut rng = StdRng::seed_from_u64(7);
        let filters = Filters::default().with_genre("pop");
        let result = rec.sample(&filters, Some(2), &mut rng).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.song.genre.eq_ignore_ascii_case("pop")));
        assert!(result.entries.windows(2).all(|w| w[0].score >= w[1].score));

        let all = rec.sample(&filters, Some(50), &mut rng).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_song_details() {
        let rec = recommender();
        let details = rec.song_details("6").unwrap();
        assert_eq!(details.song.popularity, 90.0);
        assert_eq!(details.mood, Mood::Energetic);
        assert_eq!(details.normalized.get(Feature::Energy), 1.0);
        assert!(rec.song_details("99").is_err());
    }

    #[test]
    fn test_reload_swaps_whole_snapshot() {
        let rec = recommender();
        let before = rec.snapshot();

        let replacement = Catalog::from_songs(vec![
            song("a", "Pop", 10.0, 0.0, 0.0),
            song("b", "Pop", 20.0, 1.0, 1.0),
        ])
        .unwrap();
        rec.replace_catalog(replacement).unwrap();

        // old handle is untouched
        assert_eq!(before.catalog().len(), 6);
        assert!(before.song_details("1").is_ok());

        let after = rec.recommend_by_filters(Filters::default(), None).unwrap();
        assert_eq!(after.ids(), ["b", "a"]);
        assert!(rec.song_details("1").is_err());
    }

    #[test]
    fn test_standard_scaling_and_cosine() {
        let catalog = recommender().snapshot().catalog().clone();
        let config = EngineConfig {
            metric: Metric::Cosine,
            scaling: Scaling::Standard,
            ..EngineConfig::default()
        };
        let rec = Recommender::from_catalog(catalog, config).unwrap();
        let result = rec.recommend_by_song("1", Filters::default(), None).unwrap();
        assert_eq!(result.len(), 5);
        assert!(result.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
