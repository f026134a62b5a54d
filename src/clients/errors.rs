use thiserror::Error;

use crate::clients::entities::ItemKey;

/// Everything that can go wrong while searching or persisting favorites.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog query failed: {0}")]
    QueryFailed(#[from] reqwest::Error),

    #[error("Stored {slot} data is corrupt: {source}")]
    StorageReadCorrupt {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {slot} from storage: {reason}")]
    StorageReadFailed { slot: String, reason: String },

    #[error("Failed to write {slot} to storage: {reason}")]
    StorageWriteFailed { slot: String, reason: String },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Item has neither a track id nor an artist id")]
    MissingIdentity,

    #[error("No item with id {0} in the search results")]
    ItemNotFound(ItemKey),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
