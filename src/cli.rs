//! # Command-Line Interface Module
//!
//! Clap definitions for the `tuneseek` binary.
//!
//! ## Commands
//!
//! - `similar`: songs close to a catalog song (by id)
//! - `similar-title`: same, resolving the song by title
//! - `features`: songs close to a raw feature vector
//! - `filter`: most popular songs matching genre/mood/popularity filters
//! - `random`: random songs matching the filters
//! - `show`, `search`, `genres`, `params`: catalog inspection
//!
//! ## Examples
//!
//! ```bash
//! tuneseek --catalog spotify.csv similar 6f807x0ima9a1j3VPbc7VN -n 5
//! tuneseek filter --genre pop --mood happy --min-popularity 60
//! tuneseek similar-title "Blinding Lights" --metric cosine
//! ```

use crate::classify::Mood;
use crate::normalize::Scaling;
use crate::recommend::Filters;
use crate::similarity::Metric;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "tuneseek")]
#[command(about = "Tuneseek: song suggestions by audio features, mood and genre")]
#[command(version)]
pub struct Args {
    /// Catalog file (CSV, or SQLite with a `songs` table)
    ///
    /// Defaults to catalog.csv in the platform data directory.
    #[arg(long, global = true, env = "TUNESEEK_CATALOG", value_hint = clap::ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Distance metric for similarity rankings (overrides the config file)
    #[arg(long, global = true)]
    pub metric: Option<Metric>,

    /// Feature scaling (overrides the config file)
    #[arg(long, global = true)]
    pub scaling: Option<Scaling>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Hard filters shared by the recommendation commands.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only songs with this genre (case-insensitive)
    #[arg(long)]
    pub genre: Option<String>,

    /// Only songs with this mood
    #[arg(long)]
    pub mood: Option<Mood>,

    /// Only songs at least this popular (0-100)
    #[arg(long)]
    pub min_popularity: Option<f64>,

    /// Number of results (default from config, normally 10)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

impl FilterArgs {
    #[must_use]
    pub fn filters(&self) -> Filters {
        Filters {
            genre: self.genre.clone(),
            mood: self.mood,
            min_popularity: self.min_popularity,
        }
    }
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Songs similar to a catalog song
    ///
    /// Ranks the filtered catalog by feature-space distance to the given song.
    /// The song itself is never part of the result.
    Similar {
        /// Song id
        id: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Songs similar to a song found by title
    ///
    /// Tries exact title, partial title, artist, then a fuzzy title match.
    /// Prints close titles when nothing matches.
    SimilarTitle {
        /// Song title (or part of it, or an artist name)
        #[arg(value_hint = clap::ValueHint::Other)]
        name: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Songs similar to a raw feature vector
    ///
    /// Values in catalog units and order: energy, tempo, danceability,
    /// loudness, liveness, valence, speechiness, acousticness.
    Features {
        /// Comma separated feature values
        #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
        values: Vec<f64>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Most popular songs matching the filters
    Filter {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Random songs matching the filters
    Random {
        #[command(flatten)]
        filters: FilterArgs,

        /// Seed for a repeatable pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show one song with its mood and normalized features
    Show {
        /// Song id
        id: String,
    },

    /// Search titles, artists and albums
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Maximum number of hits
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List genres with song counts
    Genres,

    /// Print the fitted normalization parameters as JSON
    Params,

    /// Generate shell completions
    ///
    /// Usage: tuneseek completion bash > ~/.local/share/bash-completion/completions/tuneseek
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List song ids and titles for completion (hidden command)
    #[command(hide = true)]
    CompleteSongs,
}
