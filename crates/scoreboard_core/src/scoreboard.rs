//! The mutation pipeline.
//!
//! Every state-changing operation on a [`Scoreboard`] runs the same steps:
//!
//! ```text
//! CapabilityCheck → Apply → Persist → Audit → Snapshot → Broadcast
//! ```
//!
//! A rejected operation stops before Apply and changes nothing. Apply uses
//! the pure transformations on [`Tournament`]; the result replaces the
//! entry with the same id in the collection and becomes the current
//! tournament. Persistence rewrites the whole collection. Storage failures
//! past Apply are logged and the in-memory state stays authoritative.
//!
//! ## Cross-context writes
//!
//! Contexts sharing a store write whole collections with no locking, so
//! two contexts mutating from stale state lose one of the updates (last
//! write wins). Sync narrows the window; it does not close it.

use crate::access::{EditorOracle, IdentityProvider, StaticOracle, UNKNOWN_ACTOR};
use crate::audit::{AuditExport, AuditTrail, ChangeAction, ChangeLogEntry};
use crate::backup::{BackupEngine, BackupRecord};
use crate::config::{Config, MIN_SHARE_CODE_LEN};
use crate::error::{CoreResult, Outcome, Rejection};
use crate::model::{
    random_token, AuthKeyId, ScoreUpdate, Team, TeamId, Tournament, TournamentId,
};
use crate::store::{CollectionStore, StoreKey};
use crate::sync::{
    BroadcastHub, ContextId, SyncBroadcaster, SyncEnvelope, SyncMessage, TimestampGate,
};
use chrono::{DateTime, Utc};
use scoreboard_storage::DurableStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Version written into [`StateExport`] documents.
pub const EXPORT_VERSION: u32 = 1;

/// Share code draws per length before a longer code is tried.
const SHARE_CODE_ATTEMPTS: usize = 32;

/// Full-state export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateExport {
    /// Document version. Missing on older exports.
    #[serde(default)]
    pub version: u32,
    /// Every tournament.
    pub tournaments: Vec<Tournament>,
}

/// Manual backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullBackup {
    /// When the backup was produced.
    pub timestamp: DateTime<Utc>,
    /// Every tournament.
    pub tournaments: Vec<Tournament>,
}

impl StateExport {
    /// Parses an import document.
    ///
    /// Tournament ids and share codes must be unique across the document.
    fn parse(text: &str) -> Result<Self, String> {
        let import: Self = serde_json::from_str(text).map_err(|e| e.to_string())?;

        {
            let mut ids = HashSet::new();
            let mut codes = HashSet::new();
            for tournament in &import.tournaments {
                if !ids.insert(&tournament.id) {
                    return Err(format!("duplicate tournament id {}", tournament.id));
                }
                if let Some(code) = tournament.share_code.as_deref() {
                    if !codes.insert(code) {
                        return Err(format!("duplicate share code {code}"));
                    }
                }
            }
        }
        Ok(import)
    }
}

/// Builder for [`Scoreboard`].
///
/// Defaults: nobody is an editor, nobody is named, no hub, default
/// [`Config`].
pub struct ScoreboardBuilder {
    store: Arc<dyn DurableStore>,
    oracle: Arc<dyn EditorOracle>,
    identity: Arc<dyn IdentityProvider>,
    hub: Option<Arc<BroadcastHub>>,
    config: Config,
}

impl ScoreboardBuilder {
    /// Sets the capability oracle.
    #[must_use]
    pub fn oracle(mut self, oracle: Arc<dyn EditorOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Sets the identity provider used for audit attribution.
    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Attaches the low-latency sync channel.
    #[must_use]
    pub fn hub(mut self, hub: Arc<BroadcastHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Loads persisted state and returns the scoreboard.
    ///
    /// Unreadable collections load as empty; opening never fails.
    #[must_use]
    pub fn open(self) -> Scoreboard {
        let store = CollectionStore::new(self.store);
        let tournaments: Vec<Tournament> = store.load(StoreKey::Tournaments);
        let audit = AuditTrail::open(store.clone(), self.config.max_change_log);
        let backups = BackupEngine::open(store.clone(), self.config.max_backups);
        let sync = self
            .config
            .sync_enabled
            .then(|| SyncBroadcaster::new(store.clone(), self.hub));

        debug!(
            tournaments = tournaments.len(),
            changes = audit.len(),
            backups = backups.len(),
            sync = sync.is_some(),
            "opened scoreboard"
        );

        Scoreboard {
            config: self.config,
            store,
            oracle: self.oracle,
            identity: self.identity,
            tournaments,
            current: None,
            audit,
            backups,
            sync,
            gate: TimestampGate::new(),
        }
    }
}

impl fmt::Debug for ScoreboardBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreboardBuilder")
            .field("hub", &self.hub.as_ref().map(|hub| hub.name()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// One context's view of the tournaments, and the only way to change them.
pub struct Scoreboard {
    config: Config,
    store: CollectionStore,
    oracle: Arc<dyn EditorOracle>,
    identity: Arc<dyn IdentityProvider>,
    tournaments: Vec<Tournament>,
    current: Option<Tournament>,
    audit: AuditTrail,
    backups: BackupEngine,
    sync: Option<SyncBroadcaster>,
    gate: TimestampGate,
}

impl Scoreboard {
    /// Starts building a scoreboard over `store`.
    pub fn builder(store: Arc<dyn DurableStore>) -> ScoreboardBuilder {
        ScoreboardBuilder {
            store,
            oracle: Arc::new(StaticOracle::DENY),
            identity: Arc::new(StaticOracle::DENY),
            hub: None,
            config: Config::default(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every tournament, in creation order.
    #[must_use]
    pub fn tournaments(&self) -> &[Tournament] {
        &self.tournaments
    }

    /// The tournament operations apply to.
    #[must_use]
    pub fn current(&self) -> Option<&Tournament> {
        self.current.as_ref()
    }

    /// The sync broadcaster, if sync is enabled.
    #[must_use]
    pub fn sync(&self) -> Option<&SyncBroadcaster> {
        self.sync.as_ref()
    }

    /// This context's id, if sync is enabled.
    #[must_use]
    pub fn context_id(&self) -> Option<ContextId> {
        self.sync.as_ref().map(SyncBroadcaster::context_id)
    }

    // Pipeline steps

    fn check_editor(&self, operation: &'static str) -> Result<(), Rejection> {
        if self.oracle.is_editor() {
            Ok(())
        } else {
            warn!(operation, "capability denied");
            Err(Rejection::CapabilityDenied)
        }
    }

    fn require_current(&self, operation: &'static str) -> Result<&Tournament, Rejection> {
        self.current.as_ref().ok_or_else(|| {
            warn!(operation, "no tournament is open");
            Rejection::NoCurrentTournament
        })
    }

    fn actor(&self) -> String {
        self.identity
            .current_actor_name()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
    }

    /// Replaces the collection entry with `updated` and makes it current.
    fn apply(&mut self, updated: Tournament) {
        match self.tournaments.iter_mut().find(|t| t.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => self.tournaments.push(updated.clone()),
        }
        self.current = Some(updated);
    }

    fn persist(&self) {
        if self.store.save(StoreKey::Tournaments, &self.tournaments) {
            debug!(count = self.tournaments.len(), "persisted tournaments");
        }
    }

    fn snapshot_current(&mut self) {
        if let Some(current) = &self.current {
            self.backups.capture(current);
        }
    }

    /// Announces the collection and records the announcement in the gate,
    /// so older remote states are not applied over it.
    fn broadcast(&mut self, tournament_id: Option<TournamentId>) {
        if let Some(sync) = &self.sync {
            let envelope = sync.announce(SyncMessage::TournamentUpdate {
                tournaments: self.tournaments.clone(),
                tournament_id,
            });
            self.gate.admit(&envelope);
            debug!(timestamp = envelope.timestamp, "announced tournament update");
        }
    }

    fn refresh_current(&mut self) {
        self.current = self
            .current
            .take()
            .and_then(|current| self.tournaments.iter().find(|t| t.id == current.id).cloned());
    }

    /// Draws share codes until one is free. Each run of collisions makes
    /// the next draws one character longer, so a crowded code space
    /// cannot stall the caller.
    fn unique_share_code(&self) -> String {
        let mut len = self.config.share_code_len.max(MIN_SHARE_CODE_LEN);
        loop {
            for _ in 0..SHARE_CODE_ATTEMPTS {
                let code = random_token(len);
                let taken = self
                    .tournaments
                    .iter()
                    .chain(self.current.iter())
                    .any(|t| t.share_code.as_deref() == Some(code.as_str()));
                if !taken {
                    return code;
                }
            }
            warn!(len, "share code space crowded, lengthening");
            len += 1;
        }
    }

    fn finish(&self, operation: &'static str, result: Result<(), Rejection>) -> Outcome {
        if let Err(rejection) = &result {
            debug!(operation, %rejection, "operation rejected");
        }
        result.into()
    }

    // Tournament lifecycle

    /// Creates a tournament with a fresh share code and makes it current.
    pub fn create_tournament(&mut self, name: impl Into<String>) -> Outcome {
        let name = name.into();
        let result = self.check_editor("create_tournament").map(|()| {
            let tournament = Tournament::new(name).with_share_code(self.unique_share_code());
            let actor = self.actor();
            self.apply(tournament.clone());
            self.persist();
            self.audit.append(ChangeLogEntry::new(
                actor,
                &tournament,
                ChangeAction::TournamentCreated,
                format!("Created tournament \"{}\"", tournament.name),
            ));
            self.snapshot_current();
            self.broadcast(Some(tournament.id));
        });
        self.finish("create_tournament", result)
    }

    /// Makes the tournament with `id` current. Not gated.
    pub fn load_tournament(&mut self, id: &TournamentId) -> Outcome {
        let result = match self.tournaments.iter().find(|t| &t.id == id) {
            Some(tournament) => {
                self.current = Some(tournament.clone());
                Ok(())
            }
            None => {
                warn!(tournament = %id, "tournament not found");
                Err(Rejection::not_found("tournament", id.as_str()))
            }
        };
        self.finish("load_tournament", result)
    }

    /// Makes the tournament with `share_code` current. Not gated.
    pub fn open_shared(&mut self, share_code: &str) -> Outcome {
        let found = self
            .tournaments
            .iter()
            .find(|t| t.share_code.as_deref() == Some(share_code))
            .cloned();
        let result = match found {
            Some(tournament) => {
                self.current = Some(tournament);
                Ok(())
            }
            None => {
                warn!(share_code, "no tournament with share code");
                Err(Rejection::not_found("share code", share_code))
            }
        };
        self.finish("open_shared", result)
    }

    /// Clears the current tournament.
    pub fn close_tournament(&mut self) {
        self.current = None;
    }

    /// Removes a tournament. Not audited and not snapshotted.
    pub fn delete_tournament(&mut self, id: &TournamentId) -> Outcome {
        let result = self.check_editor("delete_tournament").and_then(|()| {
            let before = self.tournaments.len();
            self.tournaments.retain(|t| &t.id != id);
            if self.tournaments.len() == before {
                warn!(tournament = %id, "tournament not found");
                return Err(Rejection::not_found("tournament", id.as_str()));
            }
            if self.current.as_ref().is_some_and(|c| &c.id == id) {
                self.current = None;
            }
            self.persist();
            self.broadcast(Some(id.clone()));
            Ok(())
        });
        self.finish("delete_tournament", result)
    }

    // Teams

    /// Adds a zeroed team to the current tournament.
    pub fn add_team(&mut self, name: impl Into<String>) -> Outcome {
        let name = name.into();
        let result = self.check_editor("add_team").and_then(|()| {
            let updated = self.require_current("add_team")?.add_team(name.as_str());
            let actor = self.actor();
            self.apply(updated.clone());
            self.persist();
            self.audit.append(
                ChangeLogEntry::new(
                    actor,
                    &updated,
                    ChangeAction::TeamAdded,
                    format!("Added team \"{name}\""),
                )
                .with_team(name.as_str()),
            );
            self.snapshot_current();
            self.broadcast(Some(updated.id));
            Ok(())
        });
        self.finish("add_team", result)
    }

    /// Removes a team from the current tournament.
    pub fn remove_team(&mut self, team_id: &TeamId) -> Outcome {
        let result = self.check_editor("remove_team").and_then(|()| {
            let current = self.require_current("remove_team")?;
            let team = current.team(team_id).cloned().ok_or_else(|| {
                warn!(team = %team_id, "team not found");
                Rejection::not_found("team", team_id.as_str())
            })?;
            let updated = current.remove_team(team_id);
            let actor = self.actor();
            self.apply(updated.clone());
            self.persist();
            self.audit.append(
                ChangeLogEntry::new(
                    actor,
                    &updated,
                    ChangeAction::TeamRemoved,
                    format!("Removed team \"{}\"", team.name),
                )
                .with_team(team.name),
            );
            self.snapshot_current();
            self.broadcast(Some(updated.id));
            Ok(())
        });
        self.finish("remove_team", result)
    }

    /// Applies a sparse counter update to a team.
    ///
    /// One audit entry is recorded per counter whose value changed, so an
    /// empty update (or one that sets current values) records none. The
    /// rest of the pipeline runs either way.
    pub fn update_team_score(&mut self, team_id: &TeamId, update: ScoreUpdate) -> Outcome {
        let result = self.check_editor("update_team_score").and_then(|()| {
            let current = self.require_current("update_team_score")?;
            let before = current.team(team_id).cloned().ok_or_else(|| {
                warn!(team = %team_id, "team not found");
                Rejection::not_found("team", team_id.as_str())
            })?;
            let updated = current.update_team_score(team_id, update);
            let after = updated
                .team(team_id)
                .cloned()
                .unwrap_or_else(|| before.clone());

            self.apply(updated.clone());
            self.persist();

            let actor = self.actor();
            let entries: Vec<_> = ScoreUpdate::diff(&before, &after)
                .into_iter()
                .map(|change| {
                    ChangeLogEntry::new(
                        actor.as_str(),
                        &updated,
                        ChangeAction::ScoreUpdate,
                        format!(
                            "Updated {} {}: {} → {}",
                            before.name, change.field, change.old, change.new
                        ),
                    )
                    .with_team(before.name.as_str())
                    .with_field_change(change)
                })
                .collect();
            debug!(team = %team_id, changes = entries.len(), "score updated");
            self.audit.append_all(entries);

            self.snapshot_current();
            self.broadcast(Some(updated.id));
            Ok(())
        });
        self.finish("update_team_score", result)
    }

    /// Ranks the current tournament's teams. Empty when none is open.
    #[must_use]
    pub fn sorted_teams(&self) -> Vec<Team> {
        self.current
            .as_ref()
            .map(Tournament::sorted_teams)
            .unwrap_or_default()
    }

    // Credentials

    /// Gives the current tournament a new share code.
    ///
    /// Not gated. Only the in-memory current tournament changes; the code
    /// reaches storage with the next persisted mutation of that tournament.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::NoCurrentTournament`] if nothing is open.
    pub fn generate_share_code(&mut self) -> Result<String, Rejection> {
        self.require_current("generate_share_code")?;
        let code = self.unique_share_code();
        self.current = self
            .current
            .take()
            .map(|current| current.with_share_code(code.as_str()));
        Ok(code)
    }

    /// Issues an auth key on the current tournament and returns its token.
    ///
    /// Gated, persisted and broadcast; not audited.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::CapabilityDenied`], [`Rejection::NoCurrentTournament`]
    /// or [`Rejection::CapacityExceeded`].
    pub fn issue_auth_key(&mut self, username: impl Into<String>) -> Result<String, Rejection> {
        self.check_editor("issue_auth_key")?;
        let limit = self.config.max_auth_keys;
        let key_len = self.config.auth_key_len;
        let (updated, key) = self
            .require_current("issue_auth_key")?
            .issue_auth_key(username, limit, key_len)
            .map_err(|rejection| {
                warn!(%rejection, "auth key not issued");
                rejection
            })?;

        self.apply(updated.clone());
        self.persist();
        self.broadcast(Some(updated.id));
        debug!(key = %key.id, username = %key.username, "issued auth key");
        Ok(key.key)
    }

    /// Removes an auth key from the current tournament.
    ///
    /// Not gated and not audited, unlike issuance.
    pub fn revoke_auth_key(&mut self, key_id: &AuthKeyId) -> Outcome {
        let result = self.require_current("revoke_auth_key").and_then(|current| {
            if !current.auth_keys.iter().any(|k| &k.id == key_id) {
                warn!(key = %key_id, "auth key not found");
                return Err(Rejection::not_found("auth key", key_id.as_str()));
            }
            Ok(current.revoke_auth_key(key_id))
        });
        let result = result.map(|updated| {
            self.apply(updated.clone());
            self.persist();
            self.broadcast(Some(updated.id));
        });
        self.finish("revoke_auth_key", result)
    }

    // Export / import

    /// Serializes every tournament as a [`StateExport`] document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_data(&self) -> CoreResult<String> {
        let export = StateExport {
            version: EXPORT_VERSION,
            tournaments: self.tournaments.clone(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Replaces the whole collection with the tournaments in `text`.
    ///
    /// Not gated. Nothing is merged; the current tournament is refreshed
    /// from the imported collection, or cleared if it is not there. A
    /// document repeating a tournament id or share code is rejected whole.
    pub fn import_data(&mut self, text: &str) -> Outcome {
        let result = match StateExport::parse(text) {
            Ok(import) => {
                debug!(
                    version = import.version,
                    count = import.tournaments.len(),
                    "importing tournaments"
                );
                self.tournaments = import.tournaments;
                self.refresh_current();
                self.persist();
                self.broadcast(None);
                Ok(())
            }
            Err(reason) => {
                warn!(%reason, "import payload rejected");
                Err(Rejection::ImportParseFailure { reason })
            }
        };
        self.finish("import_data", result)
    }

    /// Serializes every tournament as a timestamped [`FullBackup`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_full_backup(&self) -> CoreResult<String> {
        let backup = FullBackup {
            timestamp: Utc::now(),
            tournaments: self.tournaments.clone(),
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Deletes every tournament, in memory and in storage.
    ///
    /// The change log and backup history are kept.
    pub fn reset(&mut self) -> Outcome {
        let result = self.check_editor("reset").map(|()| {
            self.tournaments.clear();
            self.current = None;
            self.store.remove(StoreKey::Tournaments);
            self.broadcast(None);
        });
        self.finish("reset", result)
    }

    // Audit

    /// Change log entries, newest first, optionally for one editor.
    #[must_use]
    pub fn change_log(&self, editor: Option<&str>) -> Vec<&ChangeLogEntry> {
        self.audit.query(editor)
    }

    /// Distinct editor names in the change log.
    #[must_use]
    pub fn change_log_editors(&self) -> Vec<&str> {
        self.audit.editors()
    }

    /// The whole change log as a downloadable document.
    #[must_use]
    pub fn export_change_log(&self) -> AuditExport {
        let name = self
            .current
            .as_ref()
            .map_or("All tournaments", |t| t.name.as_str());
        self.audit.export_snapshot(name)
    }

    /// Empties the change log. Not gated.
    pub fn clear_change_log(&mut self) {
        self.audit.clear();
    }

    // Backups

    /// Automatic backups, newest first.
    #[must_use]
    pub fn backup_history(&self) -> &[BackupRecord] {
        self.backups.history()
    }

    /// Restores the tournament captured at `index` and makes it current.
    ///
    /// Not gated. The restored tournament replaces the entry with the same
    /// id, or is appended if that tournament was deleted. No new backup is
    /// taken.
    pub fn restore_backup(&mut self, index: usize) -> Outcome {
        let result = self.backups.snapshot(index).map(|tournament| {
            let id = tournament.id.clone();
            self.apply(tournament);
            self.persist();
            self.broadcast(Some(id));
        });
        self.finish("restore_backup", result)
    }

    // Sync

    /// Applies a remote snapshot if it comes after the last state this
    /// context applied or announced.
    ///
    /// Returns true if state changed. Own envelopes, stale envelopes and
    /// unknown message kinds are ignored. Nothing is persisted; the sender
    /// already did.
    pub fn reconcile(&mut self, envelope: &SyncEnvelope) -> bool {
        if self.context_id() == Some(envelope.origin) {
            return false;
        }

        let tournaments = match &envelope.message {
            SyncMessage::TournamentUpdate { tournaments, .. } => tournaments,
            SyncMessage::Unknown => {
                debug!(version = envelope.version, "ignoring unknown sync message");
                return false;
            }
        };

        if !self.gate.admit(envelope) {
            debug!(timestamp = envelope.timestamp, "ignoring stale sync envelope");
            return false;
        }
        if let Some(sync) = &self.sync {
            sync.observe(envelope.timestamp);
        }

        self.tournaments = tournaments.clone();
        self.refresh_current();
        debug!(
            origin = %envelope.origin,
            timestamp = envelope.timestamp,
            count = self.tournaments.len(),
            "reconciled remote state"
        );
        true
    }

    /// Pumps the broadcaster and reconciles everything it delivered.
    ///
    /// Returns how many envelopes changed state.
    pub fn pump_sync(&mut self) -> usize {
        let delivered = match &self.sync {
            Some(sync) => sync.pump(),
            None => return 0,
        };
        delivered
            .iter()
            .filter(|envelope| self.reconcile(envelope))
            .count()
    }
}

impl fmt::Debug for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scoreboard")
            .field("tournaments", &self.tournaments.len())
            .field("current", &self.current.as_ref().map(|t| &t.id))
            .field("changes", &self.audit.len())
            .field("backups", &self.backups.len())
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
