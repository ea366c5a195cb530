//! Error types for the note store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the persistence file.
///
/// Mutating store operations never return these; they log them and keep the
/// in-memory state. [`crate::NoteStore::persist`] surfaces them directly.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system operation failed.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persistence file parsed but is not a JSON array.
    #[error("Invalid data in '{}': expected an array of notes", path.display())]
    InvalidFormat { path: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
