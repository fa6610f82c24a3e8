//! Error types for cinegraph

use thiserror::Error;

/// Failures at the graph store seam
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store unreachable or credentials rejected
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single statement failed
    #[error("Query error: {0}")]
    Query(String),

    /// The client was used after `close()`
    #[error("Store client is closed")]
    Closed,

    /// A result row did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<neo4rs::Error> for StoreError {
    fn from(e: neo4rs::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

/// A raw record that cannot become a canonical movie
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("review score {0:?} is not a number")]
    InvalidScore(String),

    #[error("review score {0} is outside 0..=100")]
    ScoreOutOfRange(f64),

    /// A field holds a JSON value of the wrong type
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Crawl failures
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: &'static str, message: String },

    #[error("catalog entry on {url} has no `{field}`")]
    MissingCatalogField { url: String, field: &'static str },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Top-level error type
#[derive(Error, Debug)]
pub enum CinegraphError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias for Results returning [`CinegraphError`].
pub type Result<T> = std::result::Result<T, CinegraphError>;
