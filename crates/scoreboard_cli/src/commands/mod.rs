//! CLI command implementations.

pub mod audit;
pub mod backup;
pub mod data;
pub mod keys;
pub mod team;
pub mod tournament;

use crate::error::{applied, CliError, CliResult};
use clap::Args;
use scoreboard_core::{EditorSession, Scoreboard, Team, TeamId, TournamentId};
use scoreboard_storage::FileStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Selects the tournament a command works on.
#[derive(Debug, Clone, Args)]
pub struct Scope {
    /// Tournament id
    #[arg(short, long)]
    pub tournament: Option<String>,

    /// Share code (read-only viewers use this)
    #[arg(short, long, conflicts_with = "tournament")]
    pub share: Option<String>,
}

/// Opens the scoreboard stored under `path`.
///
/// With an editor name the session is signed in; without one it is a
/// viewer and gated commands are rejected.
pub fn open(path: &Path, editor: Option<&str>) -> CliResult<Scoreboard> {
    let store = FileStore::open(path)?;
    let session = Arc::new(match editor {
        Some(name) => EditorSession::signed_in(name),
        None => EditorSession::viewer(),
    });
    debug!(path = %path.display(), editor, "opening scoreboard");

    Ok(Scoreboard::builder(Arc::new(store))
        .oracle(session.clone())
        .identity(session)
        .open())
}

/// Makes the tournament named by `scope` current.
pub fn select(board: &mut Scoreboard, scope: &Scope) -> CliResult<()> {
    match (&scope.tournament, &scope.share) {
        (Some(id), _) => applied(board.load_tournament(&TournamentId::from(id.as_str()))),
        (None, Some(code)) => applied(board.open_shared(code)),
        (None, None) => Err(CliError::usage(
            "select a tournament with --tournament <id> or --share <code>",
        )),
    }
}

/// Finds a team of the current tournament by id or exact name.
pub fn resolve_team(board: &Scoreboard, team: &str) -> CliResult<TeamId> {
    let current = board
        .current()
        .ok_or_else(|| CliError::usage("no tournament selected"))?;
    current
        .teams
        .iter()
        .find(|t| t.id.as_str() == team)
        .or_else(|| current.teams.iter().find(|t| t.name == team))
        .map(|t| t.id.clone())
        .ok_or_else(|| CliError::usage(format!("no team '{team}' in {}", current.name)))
}

fn print_team_row(rank: usize, team: &Team) {
    println!(
        "  {:>2}. {:<20} P {:>4}  W {:>3}  L {:>3}  R {:>3}  ({})",
        rank, team.name, team.points, team.wins, team.losses, team.rounds, team.id
    );
}
