//! # Scoreboard Storage
//!
//! Durable store trait and implementations for Scoreboard.
//!
//! This crate provides the lowest-level persistence abstraction. Stores are
//! **opaque key-value byte stores** - they do not interpret the values they
//! hold, and every write replaces the whole value under its key.
//!
//! ## Design Principles
//!
//! - Whole-value `load` / `save` / `remove` per key, no partial writes
//! - Read-after-write consistency within a process
//! - Must be `Send + Sync` so several contexts can share one store
//! - No transactions and no cross-key atomicity
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral sessions
//! - [`FileStore`] - One file per key inside a directory
//!
//! ## Example
//!
//! ```rust
//! use scoreboard_storage::{DurableStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.save("tournaments", b"[]").unwrap();
//! assert_eq!(store.load("tournaments").unwrap().as_deref(), Some(&b"[]"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use store::{validate_key, DurableStore, MAX_KEY_LEN};
