//! Append-only audit trail of mutations.
//!
//! Entries are prepended (newest first), trimmed to a fixed capacity and
//! persisted as a whole after every append. An entry is never edited once
//! recorded; the only ways entries leave are eviction past the cap and an
//! explicit [`AuditTrail::clear`].

use crate::model::number;
use crate::model::{EntryId, FieldChange, Tournament, TournamentId};
use crate::store::{CollectionStore, StoreKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// A team counter changed.
    ScoreUpdate,
    /// A team was added.
    TeamAdded,
    /// A team was removed.
    TeamRemoved,
    /// A tournament was created.
    TournamentCreated,
    /// A tournament was deleted.
    TournamentDeleted,
}

impl ChangeAction {
    /// Returns the stored action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScoreUpdate => "score_update",
            Self::TeamAdded => "team_added",
            Self::TeamRemoved => "team_removed",
            Self::TournamentCreated => "tournament_created",
            Self::TournamentDeleted => "tournament_deleted",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// When the mutation happened.
    pub timestamp: DateTime<Utc>,
    /// The editor who made the change.
    pub admin_name: String,
    /// Tournament the change applies to.
    pub tournament_id: TournamentId,
    /// Tournament name at the time of the change.
    pub tournament_name: String,
    /// Kind of change.
    pub action: ChangeAction,
    /// Team involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Counter involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_changed: Option<String>,
    /// Counter value before the change.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub old_value: Option<f64>,
    /// Counter value after the change.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub new_value: Option<f64>,
    /// Human-readable summary.
    pub description: String,
}

impl ChangeLogEntry {
    /// Creates an entry for `tournament`, stamped now.
    #[must_use]
    pub fn new(
        editor: impl Into<String>,
        tournament: &Tournament,
        action: ChangeAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            timestamp: Utc::now(),
            admin_name: editor.into(),
            tournament_id: tournament.id.clone(),
            tournament_name: tournament.name.clone(),
            action,
            team_name: None,
            field_changed: None,
            old_value: None,
            new_value: None,
            description: description.into(),
        }
    }

    /// Attaches the team involved.
    #[must_use]
    pub fn with_team(mut self, name: impl Into<String>) -> Self {
        self.team_name = Some(name.into());
        self
    }

    /// Attaches a counter change.
    #[must_use]
    pub fn with_field_change(mut self, change: FieldChange) -> Self {
        self.field_changed = Some(change.field.to_string());
        self.old_value = Some(change.old);
        self.new_value = Some(change.new);
        self
    }
}

/// Downloadable audit document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditExport {
    /// When the export was produced.
    pub export_date: DateTime<Utc>,
    /// Tournament the export was requested for.
    pub tournament_name: String,
    /// Number of entries in `changes`.
    pub total_changes: usize,
    /// Entries, newest first.
    pub changes: Vec<ChangeLogEntry>,
}

/// The bounded, persisted change log.
#[derive(Debug)]
pub struct AuditTrail {
    store: CollectionStore,
    entries: Vec<ChangeLogEntry>,
    capacity: usize,
}

impl AuditTrail {
    /// Loads the trail from `store`, keeping at most `capacity` entries.
    #[must_use]
    pub fn open(store: CollectionStore, capacity: usize) -> Self {
        let mut entries: Vec<ChangeLogEntry> = store.load(StoreKey::ChangeLog);
        entries.truncate(capacity);
        Self {
            store,
            entries,
            capacity,
        }
    }

    /// Records an entry at the front and persists the trail.
    pub fn append(&mut self, entry: ChangeLogEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.store.save(StoreKey::ChangeLog, &self.entries);
    }

    /// Records several entries, in order, with a single write.
    pub fn append_all(&mut self, entries: impl IntoIterator<Item = ChangeLogEntry>) {
        let before = self.entries.len();
        for entry in entries {
            self.entries.insert(0, entry);
        }
        if self.entries.len() == before {
            return;
        }
        self.entries.truncate(self.capacity);
        self.store.save(StoreKey::ChangeLog, &self.entries);
    }

    /// All entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[ChangeLogEntry] {
        &self.entries
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first, optionally only those by one editor.
    #[must_use]
    pub fn query(&self, editor: Option<&str>) -> Vec<&ChangeLogEntry> {
        self.entries
            .iter()
            .filter(|e| editor.map_or(true, |name| e.admin_name == name))
            .collect()
    }

    /// Distinct editor names, in order of their most recent entry.
    #[must_use]
    pub fn editors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.admin_name.as_str()) {
                names.push(&entry.admin_name);
            }
        }
        names
    }

    /// Builds the export document for the whole trail.
    #[must_use]
    pub fn export_snapshot(&self, tournament_name: impl Into<String>) -> AuditExport {
        AuditExport {
            export_date: Utc::now(),
            tournament_name: tournament_name.into(),
            total_changes: self.entries.len(),
            changes: self.entries.clone(),
        }
    }

    /// Drops every entry and the persisted trail.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.store.remove(StoreKey::ChangeLog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoreField;
    use scoreboard_storage::{DurableStore, InMemoryStore};
    use std::sync::Arc;

    fn trail(capacity: usize) -> (Arc<InMemoryStore>, AuditTrail) {
        let raw = Arc::new(InMemoryStore::new());
        let trail = AuditTrail::open(CollectionStore::new(raw.clone()), capacity);
        (raw, trail)
    }

    fn entry(editor: &str, n: usize) -> ChangeLogEntry {
        let t = Tournament::new("Cup");
        ChangeLogEntry::new(editor, &t, ChangeAction::TeamAdded, format!("change {n}"))
    }

    #[test]
    fn append_prepends_and_persists() {
        let (raw, mut trail) = trail(500);
        trail.append(entry("Nithi", 1));
        trail.append(entry("Nithi", 2));

        assert_eq!(trail.entries()[0].description, "change 2");
        assert_eq!(trail.entries()[1].description, "change 1");
        assert!(raw.load("changeLog").unwrap().is_some());

        let reopened = AuditTrail::open(CollectionStore::new(raw), 500);
        assert_eq!(reopened.entries(), trail.entries());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let (_, mut trail) = trail(3);
        for n in 0..5 {
            trail.append(entry("a", n));
        }

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.entries()[0].description, "change 4");
        assert_eq!(trail.entries()[2].description, "change 2");
    }

    #[test]
    fn append_all_keeps_order() {
        let (_, mut trail) = trail(500);
        trail.append_all(vec![entry("a", 1), entry("a", 2)]);
        assert_eq!(trail.entries()[0].description, "change 2");
    }

    #[test]
    fn append_all_empty_writes_nothing() {
        let (raw, mut trail) = trail(500);
        trail.append_all(Vec::new());
        assert!(raw.load("changeLog").unwrap().is_none());
    }

    #[test]
    fn query_by_editor() {
        let (_, mut trail) = trail(500);
        trail.append(entry("alice", 1));
        trail.append(entry("bob", 2));
        trail.append(entry("alice", 3));

        assert_eq!(trail.query(None).len(), 3);
        let alice = trail.query(Some("alice"));
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].description, "change 3");
        assert!(trail.query(Some("carol")).is_empty());
        assert_eq!(trail.editors(), ["alice", "bob"]);
    }

    #[test]
    fn export_shape() {
        let (_, mut trail) = trail(500);
        trail.append(entry("alice", 1));

        let export = trail.export_snapshot("Cup");
        assert_eq!(export.total_changes, 1);
        let json = serde_json::to_value(&export).unwrap();
        assert!(json.get("exportDate").is_some());
        assert_eq!(json["tournamentName"], "Cup");
        assert_eq!(json["totalChanges"], 1);
        assert_eq!(json["changes"][0]["action"], "team_added");
        assert_eq!(json["changes"][0]["adminName"], "alice");
    }

    #[test]
    fn field_change_entry() {
        let t = Tournament::new("Cup");
        let e = ChangeLogEntry::new("a", &t, ChangeAction::ScoreUpdate, "Red points")
            .with_team("Red")
            .with_field_change(FieldChange {
                field: ScoreField::Points,
                old: 1.0,
                new: 4.5,
            });

        assert_eq!(e.field_changed.as_deref(), Some("Points"));
        assert_eq!((e.old_value, e.new_value), (Some(1.0), Some(4.5)));

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["oldValue"], 1);
        assert_eq!(json["newValue"], 4.5);
        assert_eq!(e.team_name.as_deref(), Some("Red"));
    }

    #[test]
    fn clear_removes_persisted_trail() {
        let (raw, mut trail) = trail(500);
        trail.append(entry("a", 1));
        trail.clear();

        assert!(trail.is_empty());
        assert!(raw.load("changeLog").unwrap().is_none());
    }

    #[test]
    fn malformed_trail_opens_empty() {
        let raw = Arc::new(InMemoryStore::with_values([("changeLog", b"[{]".to_vec())]));
        let trail = AuditTrail::open(CollectionStore::new(raw), 500);
        assert!(trail.is_empty());
    }
}
