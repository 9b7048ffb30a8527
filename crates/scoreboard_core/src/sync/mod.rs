//! Cross-context change propagation.
//!
//! A context (one open [`crate::Scoreboard`]) announces every persisted
//! change so other contexts on the same device can refresh. Two channels
//! carry announcements:
//! - the primary [`BroadcastHub`], a low-latency in-process fan-out that may
//!   be absent;
//! - a durable slot in the shared store, always written, observed by
//!   polling.
//!
//! Delivery is at-most-once per channel, may be duplicated across the two
//! channels, and is unordered. Consumers gate on
//! [`SyncEnvelope::stamp`] (see [`TimestampGate`]) and must be idempotent.
//! A context's own announcements pass through its gate too, so it never
//! applies a remote state older than one it wrote. This layer never merges
//! state.

mod broadcaster;
mod envelope;
mod hub;

pub use broadcaster::{Subscription, SyncBroadcaster};
pub use envelope::{ContextId, SyncEnvelope, SyncMessage, TimestampGate, SCHEMA_VERSION};
pub use hub::BroadcastHub;
