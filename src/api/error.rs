//! Error types for the library API.

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to the prompt store (file access, parsing, validation).
#[derive(Error, Debug)]
pub enum StoreError {
    /// An error occurred during store initialization.
    #[error("Failed to initialize store: {0}")]
    Init(String),

    /// The requested prompt could not be found by its name.
    ///
    /// Repository lookups return `Option` instead; this variant is for
    /// callers that need to turn an absent record into a failure.
    #[error("Prompt '{0}' not found")]
    NotFound(String),

    /// Input was rejected before it reached the document store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The primary document could not be written. The triggering
    /// operation did not take effect.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing, reading or restoring a backup failed.
    #[error("Backup error: {0}")]
    Backup(String),

    /// The application configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An underlying file I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize data.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Write {
            path: path.into(),
            source,
        }
    }
}
