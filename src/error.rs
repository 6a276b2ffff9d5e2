use thiserror::Error;

/// Errors surfaced by the controller, the providers and the configuration layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search service answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed search payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid sort selection {0:?}: expected `field` or `field:asc|desc`")]
    InvalidSort(String),

    #[error("invalid configuration value for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    /// Failures reported by providers that are not built on this crate's backends.
    #[error("search provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;
