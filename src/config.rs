//! # Configuration Module
//!
//! Platform data/config locations and the engine settings file.
//!
//! ## Locations
//!
//! The default catalog lives in the platform-standard data directory:
//! - Linux: `~/.local/share/tuneseek/catalog.csv`
//! - macOS: `~/Library/Application Support/tuneseek/catalog.csv`
//! - Windows: `%APPDATA%\tuneseek\catalog.csv`
//!
//! Engine settings are read from `<config_dir>/tuneseek/config.json` when it exists.
//! Every field is optional; command-line flags override the file.
//!
//! ```json
//! { "default_count": 10, "metric": "euclidean", "scaling": "min-max", "search_limit": 10 }
//! ```

use crate::normalize::Scaling;
use crate::similarity::Metric;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Results returned when a query does not say how many it wants.
pub const DEFAULT_COUNT: usize = 10;

/// Upper bound on text search hits.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Returns the platform-appropriate data directory for Tuneseek, creating it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The tuneseek subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please pass --catalog or set TUNESEEK_CATALOG."
        )
    })?;

    let dir = data_dir.join("tuneseek");
    fs::create_dir_all(&dir).with_context(|| {
        format!(
            "Failed to create Tuneseek data directory at {}. Please check file permissions.",
            dir.display()
        )
    })?;

    Ok(dir)
}

/// Default catalog file, `catalog.csv` in the data directory.
///
/// # Examples
///
/// ```no_run
/// use tuneseek::config::get_catalog_path;
///
/// let path = get_catalog_path()?;
/// println!("Catalog location: {}", path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_catalog_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("catalog.csv"))
}

/// Location of the engine settings file. `None` when the platform has no config dir.
#[must_use]
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tuneseek").join("config.json"))
}

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Result count when a query gives none
    pub default_count: usize,
    pub metric: Metric,
    pub scaling: Scaling,
    pub search_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_COUNT,
            metric: Metric::default(),
            scaling: Scaling::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Read settings from `path`. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not valid settings JSON, or if a
    /// count is zero.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if config.default_count == 0 || config.search_limit == 0 {
            anyhow::bail!(
                "Invalid config file {}: default_count and search_limit must be at least 1",
                path.display()
            );
        }

        debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Settings from the platform config file, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::from_file`].
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Catalog file to load
    pub catalog_path: PathBuf,
    pub engine: EngineConfig,
}

impl RuntimeConfig {
    /// Combine the settings file with command-line overrides.
    ///
    /// # Errors
    ///
    /// Fails when the settings file is invalid or, with no `catalog_path` given, the data
    /// directory cannot be determined.
    pub fn resolve(
        catalog_path: Option<PathBuf>,
        metric: Option<Metric>,
        scaling: Option<Scaling>,
    ) -> Result<Self> {
        let mut engine = EngineConfig::load()?;
        if let Some(metric) = metric {
            engine.metric = metric;
        }
        if let Some(scaling) = scaling {
            engine.scaling = scaling;
        }

        let catalog_path = match catalog_path {
            Some(path) => path,
            None => get_catalog_path()?,
        };

        Ok(Self { catalog_path, engine })
    }
}
