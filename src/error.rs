//! Error types for the recommendation engine.
//!
//! Load-time problems are [`RecommendError::Data`] and abort startup. Per-query problems
//! are [`RecommendError::NotFound`] and [`RecommendError::InvalidQuery`]; they are handed
//! back to the caller and never touch the loaded catalog.

use thiserror::Error;

/// Main error type for the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Malformed or missing catalog input
    #[error("Catalog data error: {0}")]
    Data(String),

    /// Referenced song is not in the catalog
    #[error("Song not found: {key}")]
    NotFound {
        key: String,
        /// Close titles, filled in by title resolution only
        suggestions: Vec<String>,
    },

    /// Malformed filters, count or feature vector
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl RecommendError {
    /// Not-found error for an id, without suggestions.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            suggestions: Vec::new(),
        }
    }

    /// Suggestions attached to a not-found error, empty for every other kind.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

impl From<csv::Error> for RecommendError {
    fn from(err: csv::Error) -> Self {
        Self::Data(format!("CSV: {err}"))
    }
}

impl From<rusqlite::Error> for RecommendError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Data(format!("SQLite: {err}"))
    }
}

impl From<std::io::Error> for RecommendError {
    fn from(err: std::io::Error) -> Self {
        Self::Data(format!("I/O: {err}"))
    }
}

/// Convenience Result type using [`RecommendError`]
pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_key() {
        let err = RecommendError::not_found("42");
        assert_eq!(err.to_string(), "Song not found: 42");
        assert!(err.suggestions().is_empty());
    }

    #[test]
    fn suggestions_only_on_not_found() {
        let err = RecommendError::NotFound {
            key: "helo".to_string(),
            suggestions: vec!["hello".to_string()],
        };
        assert_eq!(err.suggestions(), ["hello".to_string()]);
        assert!(RecommendError::InvalidQuery("x".into()).suggestions().is_empty());
    }
}
