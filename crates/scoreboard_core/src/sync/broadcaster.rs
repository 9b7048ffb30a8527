//! Announcing changes and delivering other contexts' announcements.

use super::envelope::{ContextId, SyncEnvelope, SyncMessage, SCHEMA_VERSION};
use super::hub::BroadcastHub;
use crate::store::{CollectionStore, StoreKey};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

type Listener = Arc<dyn Fn(&SyncEnvelope) + Send + Sync>;
type Listeners = RwLock<Vec<(u64, Listener)>>;

/// Best-effort propagation of state changes between contexts.
///
/// [`announce`](Self::announce) posts to the hub (when attached) and always
/// writes the durable slot. [`pump`](Self::pump) drains both and hands
/// what arrived to the subscribed listeners. Nothing here fails the
/// caller: problems are logged and the announcement is dropped.
pub struct SyncBroadcaster {
    context: ContextId,
    store: CollectionStore,
    hub: Option<Arc<BroadcastHub>>,
    inbox: Mutex<Option<Receiver<SyncEnvelope>>>,
    listeners: Arc<Listeners>,
    next_listener: AtomicU64,
    clock: AtomicU64,
    slot_seen: Mutex<Option<(u64, ContextId)>>,
}

impl SyncBroadcaster {
    /// Creates a broadcaster for a new context.
    ///
    /// An envelope already sitting in the durable slot is treated as seen.
    #[must_use]
    pub fn new(store: CollectionStore, hub: Option<Arc<BroadcastHub>>) -> Self {
        let context = ContextId::new();
        let inbox = hub.as_ref().map(|hub| hub.join(context));
        let slot_seen = store
            .try_load_document::<SyncEnvelope>(StoreKey::SyncEvent)
            .ok()
            .flatten()
            .map(|envelope| envelope.stamp());

        Self {
            context,
            store,
            hub,
            inbox: Mutex::new(inbox),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener: AtomicU64::new(0),
            clock: AtomicU64::new(0),
            slot_seen: Mutex::new(slot_seen),
        }
    }

    /// This context's id.
    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    /// Returns true if the low-latency channel is attached.
    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.hub.is_some()
    }

    fn next_timestamp(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let previous = self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        now.max(previous.saturating_add(1))
    }

    /// Moves the clock past `timestamp`, so the next announcement is
    /// stamped after a remote change this context has applied.
    pub fn observe(&self, timestamp: u64) {
        self.clock.fetch_max(timestamp, Ordering::SeqCst);
    }

    /// Wraps `message` in an envelope and sends it on both channels.
    ///
    /// Returns the envelope that was sent.
    pub fn announce(&self, message: SyncMessage) -> SyncEnvelope {
        let envelope = SyncEnvelope {
            version: SCHEMA_VERSION,
            origin: self.context,
            timestamp: self.next_timestamp(),
            message,
        };

        if let Some(hub) = &self.hub {
            let delivered = hub.post(&envelope);
            debug!(channel = hub.name(), delivered, timestamp = envelope.timestamp, "posted sync envelope");
        }

        if let Err(e) = self.store.try_save_document(StoreKey::SyncEvent, &envelope) {
            warn!(error = %e, "failed to write sync slot");
        }

        envelope
    }

    /// Registers `listener` for envelopes delivered by [`pump`](Self::pump).
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncEnvelope) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.write().push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Collects envelopes from other contexts and delivers them.
    ///
    /// Returns every envelope delivered, hub arrivals first. The same
    /// change may show up twice, once per channel.
    pub fn pump(&self) -> Vec<SyncEnvelope> {
        let mut received = Vec::new();

        if let Some(inbox) = self.inbox.lock().as_ref() {
            while let Ok(envelope) = inbox.try_recv() {
                received.push(envelope);
            }
        }

        match self.store.try_load_document::<SyncEnvelope>(StoreKey::SyncEvent) {
            Ok(Some(envelope)) if envelope.origin != self.context => {
                let mut seen = self.slot_seen.lock();
                let fresh = match *seen {
                    Some(last) => envelope.stamp() > last,
                    None => true,
                };
                if fresh {
                    *seen = Some(envelope.stamp());
                    received.push(envelope);
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "sync slot is unreadable"),
        }

        if received.is_empty() {
            return received;
        }

        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for envelope in &received {
            for listener in &listeners {
                listener(envelope);
            }
        }

        received
    }

    /// Leaves the hub and drops every listener.
    pub fn close(&self) {
        self.inbox.lock().take();
        self.listeners.write().clear();
    }
}

impl fmt::Debug for SyncBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncBroadcaster")
            .field("context", &self.context)
            .field("hub", &self.hub.as_ref().map(|hub| hub.name()))
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
