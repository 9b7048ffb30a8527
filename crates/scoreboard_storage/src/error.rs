//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key is empty, too long, or contains characters a store cannot hold.
    #[error("invalid store key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// The stored value could not be read back intact.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}
