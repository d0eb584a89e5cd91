//! # Tuneseek
//!
//! Command-line front end for the recommendation engine. Loads a song catalog (CSV or
//! SQLite), normalizes and classifies it once, then answers one query per invocation.
//!
//! ## Usage
//!
//! ```bash
//! # Songs like a given track, restricted to pop
//! tuneseek --catalog spotify.csv similar 6f807x0ima9a1j3VPbc7VN --genre pop
//!
//! # Happy songs, most popular first
//! tuneseek filter --mood happy -n 20
//!
//! # Close to a raw feature vector, as JSON
//! tuneseek --json features --values 0.8,120,0.7,-5,0.1,0.9,0.04,0.2
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tuneseek::catalog::{CatalogSource, Feature, Song};
use tuneseek::cli::{self, Command};
use tuneseek::completion;
use tuneseek::config::RuntimeConfig;
use tuneseek::error::RecommendError;
use tuneseek::recommend::{Recommendation, Recommender, SongDetails};

/// Main entry point.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug tuneseek filter --genre rock` - Enable debug logging
/// - `RUST_LOG=tuneseek::similarity=trace tuneseek similar ID` - Per-candidate distances
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    // Completion needs no catalog
    if let Command::Completion { shell } = &args.command {
        let mut cmd = cli::Args::command();
        return completion::print_completions(shell, &mut cmd);
    }

    let runtime = RuntimeConfig::resolve(args.catalog.clone(), args.metric, args.scaling)?;
    debug!("Runtime config: {runtime:?}");

    let source = CatalogSource::from_path(&runtime.catalog_path);
    let recommender = Recommender::load(&source, runtime.engine)
        .with_context(|| format!("Failed to load catalog {}", runtime.catalog_path.display()))?;
    info!(
        "Loaded {} songs from {}",
        recommender.snapshot().catalog().len(),
        runtime.catalog_path.display()
    );

    let json = args.json;
    match args.command {
        Command::Similar { id, filters } => {
            let result = recommender.recommend_by_song(&id, filters.filters(), filters.count);
            print_recommendation(report_not_found(result)?, json)?;
        }
        Command::SimilarTitle { name, filters } => {
            let (song, result) =
                report_not_found(recommender.recommend_by_title(&name, filters.filters(), filters.count))?;
            if !json {
                println!("Songs like \"{}\" by {}:", song.title, song.artist);
            }
            print_recommendation(result, json)?;
        }
        Command::Features { values, filters } => {
            let result = recommender.recommend_by_features(&values, filters.filters(), filters.count)?;
            print_recommendation(result, json)?;
        }
        Command::Filter { filters } => {
            let result = recommender.recommend_by_filters(filters.filters(), filters.count)?;
            print_recommendation(result, json)?;
        }
        Command::Random { filters, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let result = recommender.sample(&filters.filters(), filters.count, &mut rng)?;
            print_recommendation(result, json)?;
        }
        Command::Show { id } => {
            let details = report_not_found(recommender.song_details(&id))?;
            if json {
                print_json(&details)?;
            } else {
                print_details(&details);
            }
        }
        Command::Search { query, limit } => {
            let hits = recommender.search(&query, limit);
            if json {
                print_json(&hits)?;
            } else if hits.is_empty() {
                println!("No songs match \"{query}\"");
            } else {
                for song in &hits {
                    println!("{}", song_line(song));
                }
            }
        }
        Command::Genres => {
            let counts = recommender.genre_counts();
            if json {
                print_json(&counts)?;
            } else {
                for (genre, count) in counts {
                    println!("{genre:<20} {count}");
                }
            }
        }
        Command::Params => {
            print_json(recommender.snapshot().params())?;
        }
        Command::CompleteSongs => {
            completion::print_song_completions(recommender.snapshot().catalog());
        }
        // handled before loading the catalog
        Command::Completion { .. } => {}
    }

    Ok(())
}

/// Print close matches for an unknown song before passing the error on.
fn report_not_found<T>(result: Result<T, RecommendError>) -> Result<T> {
    if let Err(err) = &result {
        let suggestions = err.suggestions();
        if !suggestions.is_empty() {
            eprintln!("Did you mean:");
            for suggestion in suggestions {
                eprintln!("  {suggestion}");
            }
        }
    }
    Ok(result?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn song_line(song: &Song) -> String {
    format!("{} - {} [{}] ({})", song.title, song.artist, song.genre, song.id)
}

fn print_recommendation(recommendation: Recommendation, json: bool) -> Result<()> {
    if json {
        return print_json(&recommendation);
    }
    if recommendation.is_empty() {
        println!("No songs match the query");
        return Ok(());
    }

    for (rank, entry) in recommendation.iter().enumerate() {
        println!(
            "{:>3}. {} {{{}, popularity {:.0}}} score {:.3}",
            rank + 1,
            song_line(&entry.song),
            entry.mood,
            entry.song.popularity,
            entry.score
        );
    }
    Ok(())
}

fn print_details(details: &SongDetails) {
    let song = &details.song;
    println!("{}", song_line(song));
    if !song.album.is_empty() {
        println!("  album:      {}", song.album);
    }
    println!("  popularity: {:.0}", song.popularity);
    if let Some(duration) = song.duration_ms {
        println!("  duration:   {}:{:02}", duration / 60_000, (duration / 1000) % 60);
    }
    println!("  mood:       {}", details.mood);
    for feature in Feature::ALL {
        println!(
            "  {:<13} {:>10.3}  -> {:.3}",
            feature.to_string(),
            song.feature(feature),
            details.normalized.get(feature)
        );
    }
}
