//! Nearest-neighbour search over normalized feature vectors.
//!
//! The catalog is small enough for an exhaustive scan: every candidate is measured,
//! the list is sorted by distance and cut at `k`. O(n·d) per query.

use crate::catalog::{Song, FEATURE_COUNT};
use crate::error::{RecommendError, Result};
use crate::normalize::NormalizedVector;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance metric. Fixed per engine, since it changes rankings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// `1 - cosine similarity`; a zero vector has similarity 0 with everything
    Cosine,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Euclidean => f.write_str("euclidean"),
            Metric::Cosine => f.write_str("cosine"),
        }
    }
}

impl Metric {
    /// Distance between two vectors of equal length. Smaller is closer.
    #[must_use]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Metric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            Metric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    /// Similarity score for a distance. Never increases as distance grows.
    #[must_use]
    pub fn score(self, distance: f64) -> f64 {
        match self {
            Metric::Euclidean => 1.0 / (1.0 + distance),
            Metric::Cosine => 1.0 - distance,
        }
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
        (dot + x * y, na + x * x, nb + y * y)
    });
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// One song that can be ranked.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Load-order position
    pub index: usize,
    pub song: &'a Song,
    pub vector: &'a NormalizedVector,
}

/// A ranked candidate.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub index: usize,
    pub song: &'a Song,
    pub distance: f64,
}

/// The `k` candidates closest to `query`, nearest first.
///
/// `exclude_id` removes the reference song from its own results. Candidates must be
/// given in load order: equal distances keep that order.
///
/// # Errors
///
/// [`RecommendError::InvalidQuery`] if `query` is not one value per feature.
pub fn nearest_neighbors<'a>(
    query: &[f64],
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    exclude_id: Option<&str>,
    k: usize,
    metric: Metric,
) -> Result<Vec<Neighbor<'a>>> {
    if query.len() != FEATURE_COUNT {
        return Err(RecommendError::InvalidQuery(format!(
            "query vector has {} values, catalog vectors have {FEATURE_COUNT}",
            query.len()
        )));
    }

    let mut ranked: Vec<Neighbor<'a>> = candidates
        .into_iter()
        .filter(|candidate| exclude_id != Some(candidate.song.id.as_str()))
        .map(|candidate| {
            let distance = metric.distance(query, candidate.vector.as_slice());
            trace!("{} -> {distance:.4}", candidate.song.id);
            Neighbor {
                index: candidate.index,
                song: candidate.song,
                distance,
            }
        })
        .collect();

    // stable sort: ties stay in load order
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(k);
    Ok(ranked)
}
