//! Error types for the AgroMitra service

use thiserror::Error;

/// Result type alias for AgroMitra operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the AgroMitra service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller supplied an invalid or incomplete request
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// External API (weather, soil, disease providers) failed
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A market scrape is already running
    #[error("Scraping is already in progress")]
    ScrapeInProgress,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
