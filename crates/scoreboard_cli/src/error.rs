//! CLI error type.

use scoreboard_core::{CoreError, Outcome, Rejection};
use scoreboard_storage::StorageError;
use std::io;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core machinery failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A document could not be written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The scoreboard refused the operation.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The command line asked for something that cannot be done.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

/// Turns a rejected outcome into an error.
pub fn applied(outcome: Outcome) -> CliResult<()> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Rejected(rejection) => Err(rejection.into()),
    }
}
