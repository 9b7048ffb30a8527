//! Low-latency in-process broadcast channel.

use super::envelope::{ContextId, SyncEnvelope};
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// A named fan-out channel shared by the contexts of one device.
///
/// The hub:
/// - Delivers each post to every member except the poster
/// - Drops members whose receiver has gone away
/// - Keeps no history; late joiners only see later posts
/// - Is thread-safe
#[derive(Debug)]
pub struct BroadcastHub {
    name: String,
    members: RwLock<Vec<(ContextId, Sender<SyncEnvelope>)>>,
}

impl BroadcastHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: RwLock::new(Vec::new()),
        }
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joins the hub as `context`.
    ///
    /// Returns a receiver for every later post by other members.
    pub fn join(&self, context: ContextId) -> Receiver<SyncEnvelope> {
        let (tx, rx) = mpsc::channel();
        self.members.write().push((context, tx));
        rx
    }

    /// Posts `envelope` to every member except its origin.
    ///
    /// Returns how many members it was handed to.
    pub fn post(&self, envelope: &SyncEnvelope) -> usize {
        let mut delivered = 0;
        let mut members = self.members.write();
        members.retain(|(context, tx)| {
            if *context == envelope.origin {
                return true;
            }
            let alive = tx.send(envelope.clone()).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });
        delivered
    }

    /// Number of joined members (including ones whose receiver is gone but
    /// has not been noticed yet).
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.read().len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new("tournament-sync")
    }
}
