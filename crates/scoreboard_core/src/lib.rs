//! # Scoreboard Core
//!
//! Tournament state and synchronization engine.
//!
//! This crate provides:
//! - The tournament / team / auth key model with pure transformations
//! - A typed collection layer over a [`DurableStore`]
//! - The mutation pipeline ([`Scoreboard`]): capability check, apply,
//!   persist, audit, snapshot, broadcast
//! - A bounded append-only audit trail
//! - A rolling backup history with point-in-time restore
//! - Best-effort broadcast of state changes to other open contexts
//!
//! ## Example
//!
//! ```rust
//! use scoreboard_core::{EditorSession, Scoreboard, ScoreUpdate};
//! use scoreboard_storage::InMemoryStore;
//! use std::sync::Arc;
//!
//! let session = Arc::new(EditorSession::signed_in("Nithi"));
//! let mut board = Scoreboard::builder(Arc::new(InMemoryStore::new()))
//!     .oracle(session.clone())
//!     .identity(session)
//!     .open();
//!
//! board.create_tournament("Cup");
//! board.add_team("Red");
//! board.add_team("Blue");
//! let red = board.current().unwrap().teams[0].id.clone();
//! board.update_team_score(&red, ScoreUpdate::new().points(3));
//!
//! let ranking: Vec<_> = board.sorted_teams().into_iter().map(|t| t.name).collect();
//! assert_eq!(ranking, ["Red", "Blue"]);
//! ```
//!
//! [`DurableStore`]: scoreboard_storage::DurableStore

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod audit;
pub mod backup;
pub mod config;
pub mod error;
pub mod model;
pub mod scoreboard;
pub mod store;
pub mod sync;

pub use access::{EditorOracle, EditorSession, IdentityProvider, StaticOracle, UNKNOWN_ACTOR};
pub use audit::{AuditExport, AuditTrail, ChangeAction, ChangeLogEntry};
pub use backup::{BackupEngine, BackupRecord};
pub use config::{Config, MIN_SHARE_CODE_LEN};
pub use error::{CoreError, CoreResult, Outcome, Rejection};
pub use model::{
    AuthKey, AuthKeyId, EntryId, FieldChange, ScoreField, ScoreUpdate, Team, TeamId, Tournament,
    TournamentId,
};
pub use scoreboard::{FullBackup, Scoreboard, ScoreboardBuilder, StateExport, EXPORT_VERSION};
pub use store::{CollectionStore, StoreKey};
pub use sync::{
    BroadcastHub, ContextId, Subscription, SyncBroadcaster, SyncEnvelope, SyncMessage,
    TimestampGate, SCHEMA_VERSION,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
