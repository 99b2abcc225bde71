//! Error types for progress persistence

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing the progress document
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform has no usable data directory
    #[error("Failed to determine data directory")]
    NoDataDir,

    /// Filesystem access failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the progress layout
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Saving was switched off to protect a document that could not be read
    #[error("Progress is not being saved: the stored document could not be read or moved aside")]
    WritesDisabled,

    /// A schema migration could not be applied
    #[error("Migration to v{version} failed: {message}")]
    Migration {
        /// Version the migration produces
        version: u32,
        /// What went wrong
        message: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }

    /// Check if the stored document itself is unusable (as opposed to the medium)
    pub fn is_corrupt_document(&self) -> bool {
        matches!(self, StorageError::Json(_) | StorageError::Migration { .. })
    }
}

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
