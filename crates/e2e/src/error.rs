//! Error types for E2E matching

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(transparent)]
    Model(#[from] lockstep_common::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Source does not expose `{accessor}` for collection `{collection}`")]
    MissingAccessor { collection: String, accessor: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("API request failed: {method} {url} returned {status}")]
    Api {
        method: String,
        url: String,
        status: u16,
    },

    #[error("Entry `{key}` in collection `{collection}` has no `{field}` field")]
    MissingField {
        collection: String,
        key: String,
        field: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
