//! Error types shared across the overlay.

use reqwest::StatusCode;

/// Persisting the ban mapping failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The configuration could not be loaded or compiled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("invalid author pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A fetched profile page did not have the expected structure.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("profile page has no {0} region")]
    MissingRegion(&'static str),

    #[error("no registration year in {0:?}")]
    NoRegistrationYear(String),
}

/// Profile stats could not be obtained for an author.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("profile responded with {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
