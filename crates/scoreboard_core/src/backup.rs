//! Rolling tournament snapshots.
//!
//! Every content mutation captures the full tournament into a
//! [`BackupRecord`]. Records are kept newest first in one global history
//! (not per tournament) bounded by [`crate::Config::max_backups`].
//!
//! ## Record Format
//!
//! ```text
//! { timestamp, tournamentId, tournamentName, teamsCount, data }
//! ```
//!
//! `data` is the tournament serialized as JSON text, so a record stays
//! readable even if the surrounding collection format changes.

use crate::error::Rejection;
use crate::model::{Tournament, TournamentId};
use crate::store::{CollectionStore, StoreKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// A point-in-time copy of one tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Tournament captured.
    pub tournament_id: TournamentId,
    /// Tournament name at capture time.
    pub tournament_name: String,
    /// Number of teams at capture time.
    pub teams_count: usize,
    /// The serialized tournament.
    pub data: String,
}

impl BackupRecord {
    /// Captures `tournament` now.
    ///
    /// # Errors
    ///
    /// Returns an error if the tournament cannot be serialized.
    pub fn capture(tournament: &Tournament) -> serde_json::Result<Self> {
        Ok(Self {
            timestamp: Utc::now(),
            tournament_id: tournament.id.clone(),
            tournament_name: tournament.name.clone(),
            teams_count: tournament.teams.len(),
            data: serde_json::to_string(tournament)?,
        })
    }

    /// Decodes the stored tournament.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a serialized tournament.
    pub fn tournament(&self) -> serde_json::Result<Tournament> {
        serde_json::from_str(&self.data)
    }
}

/// The bounded, persisted backup history.
#[derive(Debug)]
pub struct BackupEngine {
    store: CollectionStore,
    records: Vec<BackupRecord>,
    capacity: usize,
}

impl BackupEngine {
    /// Loads the history from `store`, keeping at most `capacity` records.
    #[must_use]
    pub fn open(store: CollectionStore, capacity: usize) -> Self {
        let mut records: Vec<BackupRecord> = store.load(StoreKey::BackupRecords);
        records.truncate(capacity);
        Self {
            store,
            records,
            capacity,
        }
    }

    /// Snapshots `tournament` at the front of the history and persists it.
    pub fn capture(&mut self, tournament: &Tournament) {
        let record = match BackupRecord::capture(tournament) {
            Ok(record) => record,
            Err(e) => {
                error!(tournament = %tournament.id, error = %e, "failed to serialize backup");
                return;
            }
        };

        self.records.insert(0, record);
        self.records.truncate(self.capacity);
        self.store.save(StoreKey::BackupRecords, &self.records);
    }

    /// All records, newest first.
    #[must_use]
    pub fn history(&self) -> &[BackupRecord] {
        &self.records
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no snapshot has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decodes the tournament stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::RestoreIndexOutOfRange`] for a missing record
    /// and [`Rejection::CorruptBackup`] for an undecodable one.
    pub fn snapshot(&self, index: usize) -> Result<Tournament, Rejection> {
        let record = self.records.get(index).ok_or_else(|| {
            warn!(index, len = self.records.len(), "backup index out of range");
            Rejection::RestoreIndexOutOfRange {
                index,
                len: self.records.len(),
            }
        })?;

        record.tournament().map_err(|e| {
            error!(index, error = %e, "backup record is unreadable");
            Rejection::CorruptBackup {
                index,
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_storage::{DurableStore, InMemoryStore};
    use std::sync::Arc;

    fn engine(capacity: usize) -> (Arc<InMemoryStore>, BackupEngine) {
        let raw = Arc::new(InMemoryStore::new());
        let engine = BackupEngine::open(CollectionStore::new(raw.clone()), capacity);
        (raw, engine)
    }

    #[test]
    fn capture_records_metadata() {
        let (raw, mut engine) = engine(50);
        let t = Tournament::new("Cup").add_team("Red").add_team("Blue");

        engine.capture(&t);

        let record = &engine.history()[0];
        assert_eq!(record.tournament_id, t.id);
        assert_eq!(record.tournament_name, "Cup");
        assert_eq!(record.teams_count, 2);
        assert_eq!(record.tournament().unwrap(), t);
        assert!(raw.load("backupRecords").unwrap().is_some());
    }

    #[test]
    fn history_is_bounded_newest_first() {
        let (_, mut engine) = engine(50);
        let mut t = Tournament::new("Cup");
        let mut first = None;
        for _ in 0..51 {
            t = t.add_team("x");
            engine.capture(&t);
            first.get_or_insert_with(|| t.clone());
        }

        assert_eq!(engine.len(), 50);
        assert_eq!(engine.history()[0].teams_count, 51);
        assert_eq!(engine.history()[49].teams_count, 2);
        assert!(engine
            .history()
            .iter()
            .all(|r| r.tournament().unwrap() != *first.as_ref().unwrap()));
    }

    #[test]
    fn snapshot_returns_exact_copy() {
        let (_, mut engine) = engine(50);
        let t1 = Tournament::new("Cup");
        let t2 = t1.add_team("Red");
        engine.capture(&t1);
        engine.capture(&t2);

        assert_eq!(engine.snapshot(0).unwrap(), t2);
        assert_eq!(engine.snapshot(1).unwrap(), t1);
    }

    #[test]
    fn snapshot_out_of_range() {
        let (_, engine) = engine(50);
        assert_eq!(
            engine.snapshot(0).unwrap_err(),
            Rejection::RestoreIndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn corrupt_record_is_reported() {
        let record = BackupRecord {
            timestamp: Utc::now(),
            tournament_id: TournamentId::from("t"),
            tournament_name: "Cup".into(),
            teams_count: 0,
            data: "not a tournament".into(),
        };
        let raw = Arc::new(InMemoryStore::with_values([(
            "backupRecords",
            serde_json::to_vec(&[record]).unwrap(),
        )]));
        let engine = BackupEngine::open(CollectionStore::new(raw), 50);

        assert!(matches!(
            engine.snapshot(0),
            Err(Rejection::CorruptBackup { index: 0, .. })
        ));
    }

    #[test]
    fn history_survives_reopen() {
        let (raw, mut engine) = engine(50);
        engine.capture(&Tournament::new("Cup"));

        let reopened = BackupEngine::open(CollectionStore::new(raw), 50);
        assert_eq!(reopened.history(), engine.history());
    }

    #[test]
    fn record_field_names() {
        let record = BackupRecord::capture(&Tournament::new("Cup")).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        for field in ["timestamp", "tournamentId", "tournamentName", "teamsCount", "data"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
