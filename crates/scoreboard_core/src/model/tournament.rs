//! Tournaments, teams and auth keys.

use super::id::{AuthKeyId, TeamId, TournamentId};
use super::number;
use super::score::ScoreUpdate;
use super::token::random_token;
use crate::error::Rejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team and its counters. Owned by exactly one tournament.
///
/// Counters are plain numbers: fractional and negative values are kept
/// as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Rounds played.
    #[serde(serialize_with = "number::serialize")]
    pub rounds: f64,
    /// Rounds won.
    #[serde(serialize_with = "number::serialize")]
    pub wins: f64,
    /// Rounds lost.
    #[serde(serialize_with = "number::serialize")]
    pub losses: f64,
    /// Ranking points.
    #[serde(serialize_with = "number::serialize")]
    pub points: f64,
}

impl Team {
    /// Creates a team with all counters at zero.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            rounds: 0.0,
            wins: 0.0,
            losses: 0.0,
            points: 0.0,
        }
    }
}

/// An access credential issued for a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthKey {
    /// Key identifier.
    pub id: AuthKeyId,
    /// The opaque token handed to the holder.
    pub key: String,
    /// Who the key was issued to.
    pub username: String,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
    /// Whether the key is live.
    pub is_active: bool,
}

/// A tournament: its teams, share code and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    /// Tournament identifier.
    pub id: TournamentId,
    /// Display name.
    pub name: String,
    /// Teams, in insertion order. Order carries no meaning.
    #[serde(default)]
    pub teams: Vec<Team>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Read-only access code for viewers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,
    /// Issued credentials.
    #[serde(default)]
    pub auth_keys: Vec<AuthKey>,
}

impl Tournament {
    /// Creates an empty tournament without a share code.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TournamentId::new(),
            name: name.into(),
            teams: Vec::new(),
            created_at: Utc::now(),
            share_code: None,
            auth_keys: Vec::new(),
        }
    }

    /// Returns a copy with the given share code.
    #[must_use]
    pub fn with_share_code(&self, code: impl Into<String>) -> Self {
        Self {
            share_code: Some(code.into()),
            ..self.clone()
        }
    }

    /// Looks up a team.
    #[must_use]
    pub fn team(&self, team_id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == team_id)
    }

    /// Returns a copy with a new zeroed team appended.
    #[must_use]
    pub fn add_team(&self, name: impl Into<String>) -> Self {
        let mut teams = self.teams.clone();
        teams.push(Team::new(name));
        Self {
            teams,
            ..self.clone()
        }
    }

    /// Returns a copy without the given team. Unknown ids leave the teams
    /// unchanged.
    #[must_use]
    pub fn remove_team(&self, team_id: &TeamId) -> Self {
        Self {
            teams: self
                .teams
                .iter()
                .filter(|t| &t.id != team_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Returns a copy with `update` applied to the given team.
    #[must_use]
    pub fn update_team_score(&self, team_id: &TeamId, update: ScoreUpdate) -> Self {
        Self {
            teams: self
                .teams
                .iter()
                .map(|t| if &t.id == team_id { update.apply(t) } else { t.clone() })
                .collect(),
            ..self.clone()
        }
    }

    /// Returns a copy holding a freshly issued key, and the key itself.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::CapacityExceeded`] when the tournament already
    /// holds `limit` keys.
    pub fn issue_auth_key(
        &self,
        username: impl Into<String>,
        limit: usize,
        key_len: usize,
    ) -> Result<(Self, AuthKey), Rejection> {
        if self.auth_keys.len() >= limit {
            return Err(Rejection::CapacityExceeded { limit });
        }

        let key = AuthKey {
            id: AuthKeyId::new(),
            key: random_token(key_len),
            username: username.into(),
            created_at: Utc::now(),
            is_active: true,
        };

        let mut auth_keys = self.auth_keys.clone();
        auth_keys.push(key.clone());
        Ok((
            Self {
                auth_keys,
                ..self.clone()
            },
            key,
        ))
    }

    /// Returns a copy without the given key.
    #[must_use]
    pub fn revoke_auth_key(&self, key_id: &AuthKeyId) -> Self {
        Self {
            auth_keys: self
                .auth_keys
                .iter()
                .filter(|k| &k.id != key_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Ranks the teams: points descending, then name ascending.
    ///
    /// The sort is stable, so teams equal on both keys keep their
    /// insertion order.
    #[must_use]
    pub fn sorted_teams(&self) -> Vec<Team> {
        let mut teams = self.teams.clone();
        teams.sort_by(|a, b| b.points.total_cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        teams
    }
}
