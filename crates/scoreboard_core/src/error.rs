//! Error types for Scoreboard core.
//!
//! Two layers live here:
//! - [`CoreError`]: failures of the machinery (storage, JSON). These are
//!   logged and recovered inside the pipeline and only surface through the
//!   `try_*` helpers used by tooling.
//! - [`Rejection`]: the domain reasons an operation left state unchanged.
//!   They are returned as values, never raised.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Scoreboard core machinery.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Durable store error.
    #[error("storage error: {0}")]
    Storage(#[from] scoreboard_storage::StorageError),

    /// JSON encoding or decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why an operation did not change any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A gated mutation was invoked by someone who is not an editor.
    #[error("current actor is not an editor")]
    CapabilityDenied,

    /// The operation needs an open tournament and none is open.
    #[error("no tournament is open")]
    NoCurrentTournament,

    /// The referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity ("tournament", "team", ...).
        kind: &'static str,
        /// The identifier or code that was looked up.
        id: String,
    },

    /// The tournament already holds the maximum number of auth keys.
    #[error("auth key limit of {limit} reached")]
    CapacityExceeded {
        /// The configured cap.
        limit: usize,
    },

    /// Restore was requested for a backup that does not exist.
    #[error("backup index {index} out of range ({len} records)")]
    RestoreIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of records available.
        len: usize,
    },

    /// A backup record's snapshot could not be decoded.
    #[error("backup {index} is unreadable: {reason}")]
    CorruptBackup {
        /// Index of the record.
        index: usize,
        /// Decoder message.
        reason: String,
    },

    /// An import payload could not be parsed or has the wrong shape.
    #[error("import failed: {reason}")]
    ImportParseFailure {
        /// Parser message.
        reason: String,
    },
}

impl Rejection {
    /// Creates a not-found rejection.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result of a pipeline operation.
///
/// A rejected operation changed nothing: no state, no persisted data, no
/// audit entry, no backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran to completion.
    Applied,
    /// The operation was refused.
    Rejected(Rejection),
}

impl Outcome {
    /// Returns true if the operation ran.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Returns the rejection, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<Result<(), Rejection>> for Outcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(rejection) => Self::Rejected(rejection),
        }
    }
}
