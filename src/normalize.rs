//! # Feature Normalizer
//!
//! Rescales every feature column to a common range so tempo (around 60 to 200) does not
//! drown out valence (0 to 1) in a distance computation.
//!
//! Parameters are fitted once from the whole catalog and reused for every query. A new
//! set only appears when a new catalog snapshot is built.
//!
//! ## Schemes
//!
//! - [`Scaling::MinMax`] (default): `(x - min) / (max - min)`, catalog values land in `[0, 1]`
//! - [`Scaling::Standard`]: `(x - mean) / std`, population standard deviation
//!
//! A column with a single distinct value has no spread. It is flagged constant and maps
//! to `0.0` for every input, under both schemes.

use crate::catalog::{Catalog, Feature, FEATURE_COUNT};
use crate::error::{RecommendError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalization scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Scaling {
    #[default]
    MinMax,
    Standard,
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scaling::MinMax => f.write_str("min-max"),
            Scaling::Standard => f.write_str("standard"),
        }
    }
}

/// Feature vector after normalization, ordered as [`Feature::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedVector(pub [f64; FEATURE_COUNT]);

impl NormalizedVector {
    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Statistics of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// No spread in the catalog; normalizes to zero
    pub constant: bool,
}

/// Fitted normalization parameters for one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub scaling: Scaling,
    pub columns: Vec<ColumnStats>,
}

impl NormalizationParams {
    /// Compute per-feature statistics over every song of `catalog`.
    ///
    /// Only order-independent aggregates are used, so the same songs always give the same
    /// parameters.
    #[must_use]
    pub fn fit(catalog: &Catalog, scaling: Scaling) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let count = catalog.len().max(1) as f64;

        let columns = Feature::ALL
            .iter()
            .map(|&feature| {
                let (min, max, sum) = catalog.all_songs().map(|song| song.feature(feature)).fold(
                    (f64::INFINITY, f64::NEG_INFINITY, 0.0),
                    |(min, max, sum), value| (min.min(value), max.max(value), sum + value),
                );
                let mean = sum / count;
                let variance = catalog
                    .all_songs()
                    .map(|song| (song.feature(feature) - mean).powi(2))
                    .sum::<f64>()
                    / count;

                let std_dev = variance.sqrt();
                let spread_overflows =
                    !(max - min).is_finite() || !mean.is_finite() || !std_dev.is_finite();
                let constant = !(max > min) || spread_overflows;
                if spread_overflows {
                    warn!("Feature `{feature}` spans {min} to {max}, too wide to scale; it will normalize to 0");
                } else if constant {
                    warn!("Feature `{feature}` has the same value ({min}) for every song; it will normalize to 0");
                }

                ColumnStats {
                    feature,
                    min,
                    max,
                    mean,
                    std_dev,
                    constant,
                }
            })
            .collect();

        let params = Self { scaling, columns };
        debug!("Fitted {scaling} normalization: {params:?}");
        params
    }

    /// Normalize a raw feature vector.
    ///
    /// Values outside the fitted range are not clamped; they come from query vectors
    /// that were never part of the catalog.
    ///
    /// # Errors
    ///
    /// [`RecommendError::InvalidQuery`] if `raw` does not have one value per feature or
    /// holds a NaN or infinite value.
    pub fn apply(&self, raw: &[f64]) -> Result<NormalizedVector> {
        if raw.len() != self.columns.len() {
            return Err(RecommendError::InvalidQuery(format!(
                "feature vector has {} values, expected {}",
                raw.len(),
                self.columns.len()
            )));
        }
        if let Some((value, stats)) = raw.iter().zip(&self.columns).find(|(value, _)| !value.is_finite()) {
            return Err(RecommendError::InvalidQuery(format!(
                "feature `{}` is not a finite number ({value})",
                stats.feature
            )));
        }

        let mut out = [0.0; FEATURE_COUNT];
        for (slot, (value, stats)) in out.iter_mut().zip(raw.iter().zip(&self.columns)) {
            *slot = self.scale(*value, stats);
            if !slot.is_finite() {
                return Err(RecommendError::InvalidQuery(format!(
                    "feature `{}` value {value} is too far outside the catalog range",
                    stats.feature
                )));
            }
        }
        Ok(NormalizedVector(out))
    }

    fn scale(&self, value: f64, stats: &ColumnStats) -> f64 {
        if stats.constant {
            return 0.0;
        }
        match self.scaling {
            Scaling::MinMax => (value - stats.min) / (stats.max - stats.min),
            Scaling::Standard if stats.std_dev > 0.0 => (value - stats.mean) / stats.std_dev,
            Scaling::Standard => 0.0,
        }
    }

    #[must_use]
    pub fn stats(&self, feature: Feature) -> &ColumnStats {
        &self.columns[feature.index()]
    }
}
