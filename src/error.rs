use crate::domain::League;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VenueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read coordinate reference '{}': {source}", .path.display())]
    Reference {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fetch task for {league} ({url}) did not complete: {reason}")]
    Task {
        league: League,
        url: String,
        reason: String,
    },

    #[error("Extraction failed for {url} (table {table_index}): {reason}")]
    Extraction {
        url: String,
        table_index: usize,
        reason: String,
    },

    #[error("{league} table is missing column '{column}' (available: {available:?})")]
    SchemaMismatch {
        league: League,
        column: String,
        available: Vec<String>,
    },

    #[error("{found} record found in the {expected} batch")]
    LeagueMismatch { expected: League, found: League },

    #[error("{0} was supplied more than once")]
    DuplicateLeague(League),
}

impl VenueError {
    pub fn extraction(url: &str, table_index: usize, reason: impl Into<String>) -> Self {
        VenueError::Extraction {
            url: url.to_string(),
            table_index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VenueError>;
