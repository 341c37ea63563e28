//! Error types for the Lockstep data model

use thiserror::Error;

/// Result type alias using the Lockstep model Error
pub type Result<T> = std::result::Result<T, Error>;

/// Lockstep model error types
///
/// These signal test-authoring mistakes (referring to fixture data that was
/// never set up) and are never recovered from inside the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown key `{key}` in collection `{collection}`")]
    UnknownKey { collection: String, key: String },

    #[error("No default registered for `{key}`")]
    MissingDefault { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn unknown_key(collection: &str, key: &str) -> Self {
        Error::UnknownKey {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }
}
