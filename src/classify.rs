//! Mood and genre classification.
//!
//! Mood is a quadrant rule over normalized energy and valence:
//!
//! ```text
//!                 valence < t      valence >= t
//! energy >= t     Energetic        Happy
//! energy <  t     Sad              Calm
//! ```
//!
//! `t` is [`MIN_MAX_THRESHOLD`] (0.5) for min-max scaling and [`STANDARD_THRESHOLD`]
//! (0.0, the catalog mean) for standard scaling. A value exactly on the threshold counts
//! as high energy / positive valence.

use crate::catalog::{Feature, Song};
use crate::normalize::{NormalizedVector, Scaling};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Energy and valence boundary under min-max scaling.
pub const MIN_MAX_THRESHOLD: f64 = 0.5;

/// Energy and valence boundary under standard scaling.
pub const STANDARD_THRESHOLD: f64 = 0.0;

/// Discrete mood of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Energetic, Mood::Calm];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood `{s}` (expected happy, sad, energetic or calm)"))
    }
}

/// Quadrant boundaries for one scaling scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodThresholds {
    pub energy: f64,
    pub valence: f64,
}

impl MoodThresholds {
    #[must_use]
    pub const fn for_scaling(scaling: Scaling) -> Self {
        let t = match scaling {
            Scaling::MinMax => MIN_MAX_THRESHOLD,
            Scaling::Standard => STANDARD_THRESHOLD,
        };
        Self { energy: t, valence: t }
    }
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self::for_scaling(Scaling::MinMax)
    }
}

/// Mood of a normalized vector.
#[must_use]
pub fn classify_mood(vector: &NormalizedVector, thresholds: MoodThresholds) -> Mood {
    let high_energy = vector.get(Feature::Energy) >= thresholds.energy;
    let positive = vector.get(Feature::Valence) >= thresholds.valence;

    match (high_energy, positive) {
        (true, true) => Mood::Happy,
        (true, false) => Mood::Energetic,
        (false, true) => Mood::Calm,
        (false, false) => Mood::Sad,
    }
}

/// The stored genre tag. No inference.
#[must_use]
pub fn genre_of(song: &Song) -> &str {
    &song.genre
}
