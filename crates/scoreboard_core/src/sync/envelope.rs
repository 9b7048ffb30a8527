//! Versioned sync payloads.

use crate::model::{Tournament, TournamentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Envelope schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Identifies one open context.
///
/// Ids are ordered so that envelopes stamped in the same millisecond by
/// different contexts still have a fixed order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Creates a new random context id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What changed.
///
/// New variants may appear in later schema versions; older readers decode
/// them as [`SyncMessage::Unknown`] and ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncMessage {
    /// The tournament collection was rewritten.
    TournamentUpdate {
        /// The whole collection after the change.
        tournaments: Vec<Tournament>,
        /// The tournament the change was about, if any.
        #[serde(default, rename = "tournamentId", skip_serializing_if = "Option::is_none")]
        tournament_id: Option<TournamentId>,
    },
    /// A message kind this build does not know.
    #[serde(other)]
    Unknown,
}

/// A timestamped, attributed announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    /// Schema version of the writer.
    pub version: u32,
    /// Context that announced the change.
    pub origin: ContextId,
    /// Milliseconds since the Unix epoch, strictly increasing per origin.
    pub timestamp: u64,
    /// The payload.
    pub message: SyncMessage,
}

impl SyncEnvelope {
    /// Position of this envelope in last-write-wins order: timestamp
    /// first, then origin.
    #[must_use]
    pub const fn stamp(&self) -> (u64, ContextId) {
        (self.timestamp, self.origin)
    }
}

/// Admits only envelopes that come after the last admitted one in
/// [`SyncEnvelope::stamp`] order.
///
/// This is the last-write-wins gate receivers put in front of their
/// reconciliation logic. Exact duplicates and stragglers are dropped. Two
/// contexts writing in the same millisecond are ordered by origin, so
/// every receiver settles on the same winner.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampGate {
    last: Option<(u64, ContextId)>,
}

impl TimestampGate {
    /// Creates a gate that admits anything once.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns true and records the stamp if `envelope` comes after
    /// everything admitted so far.
    pub fn admit(&mut self, envelope: &SyncEnvelope) -> bool {
        let stamp = envelope.stamp();
        match self.last {
            Some(last) if stamp <= last => false,
            _ => {
                self.last = Some(stamp);
                true
            }
        }
    }

    /// Timestamp of the last admitted envelope.
    #[must_use]
    pub fn last(&self) -> Option<u64> {
        self.last.map(|(timestamp, _)| timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(timestamp: u64) -> SyncEnvelope {
        envelope_from(ContextId::new(), timestamp)
    }

    fn envelope_from(origin: ContextId, timestamp: u64) -> SyncEnvelope {
        SyncEnvelope {
            version: SCHEMA_VERSION,
            origin,
            timestamp,
            message: SyncMessage::TournamentUpdate {
                tournaments: vec![Tournament::new("Cup")],
                tournament_id: None,
            },
        }
    }

    fn ordered_origins() -> (ContextId, ContextId) {
        let (a, b) = (ContextId::new(), ContextId::new());
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    #[test]
    fn gate_drops_stale_and_duplicate() {
        let mut gate = TimestampGate::new();
        let first = envelope(10);
        assert!(gate.admit(&first));
        assert!(!gate.admit(&first));
        assert!(!gate.admit(&envelope(9)));
        assert!(gate.admit(&envelope(11)));
        assert_eq!(gate.last(), Some(11));
    }

    #[test]
    fn same_millisecond_orders_by_origin() {
        let (low, high) = ordered_origins();

        let mut gate = TimestampGate::new();
        assert!(gate.admit(&envelope_from(low, 1_000)));
        assert!(gate.admit(&envelope_from(high, 1_000)));
        assert!(!gate.admit(&envelope_from(high, 1_000)));

        let mut other = TimestampGate::new();
        assert!(other.admit(&envelope_from(high, 1_000)));
        assert!(!other.admit(&envelope_from(low, 1_000)));
        assert!(other.admit(&envelope_from(low, 1_001)));
    }

    #[test]
    fn message_is_tagged() {
        let json = serde_json::to_value(envelope(1)).unwrap();
        assert_eq!(json["version"], SCHEMA_VERSION);
        assert_eq!(json["message"]["type"], "tournament-update");
        assert!(json["message"]["tournaments"].is_array());
    }

    #[test]
    fn unknown_message_kind_decodes() {
        let origin = ContextId::new();
        let json = format!(
            r#"{{"version":7,"origin":"{origin}","timestamp":5,"message":{{"type":"score-burst","extra":1}}}}"#
        );
        let decoded: SyncEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.message, SyncMessage::Unknown);
        assert_eq!(decoded.version, 7);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let origin = ContextId::new();
        let json = format!(
            r#"{{"version":2,"origin":"{origin}","timestamp":5,"future":true,"message":{{"type":"tournament-update","tournaments":[],"hint":"x"}}}}"#
        );
        let decoded: SyncEnvelope = serde_json::from_str(&json).unwrap();
        assert!(matches!(decoded.message, SyncMessage::TournamentUpdate { .. }));
    }
}
