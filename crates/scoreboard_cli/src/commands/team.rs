//! Team commands.

use super::{open, print_team_row, resolve_team, select, Scope};
use crate::error::{applied, CliResult};
use scoreboard_core::ScoreUpdate;
use std::path::Path;
use tracing::info;

/// Add a team to a tournament.
pub fn add(path: &Path, editor: Option<&str>, scope: &Scope, name: &str) -> CliResult<()> {
    info!("Adding team {:?}", name);
    let mut board = open(path, editor)?;
    select(&mut board, scope)?;
    applied(board.add_team(name))?;
    println!("✓ Team added");
    Ok(())
}

/// Remove a team, found by id or name.
pub fn remove(path: &Path, editor: Option<&str>, scope: &Scope, team: &str) -> CliResult<()> {
    info!("Removing team {:?}", team);
    let mut board = open(path, editor)?;
    select(&mut board, scope)?;
    let team_id = resolve_team(&board, team)?;
    applied(board.remove_team(&team_id))?;
    println!("✓ Team removed");
    Ok(())
}

/// Apply a sparse counter update to a team.
pub fn score(
    path: &Path,
    editor: Option<&str>,
    scope: &Scope,
    team: &str,
    update: ScoreUpdate,
) -> CliResult<()> {
    info!("Updating score of {:?}", team);
    let mut board = open(path, editor)?;
    select(&mut board, scope)?;
    let team_id = resolve_team(&board, team)?;
    let changes_before = board.change_log(None).len();
    applied(board.update_team_score(&team_id, update))?;

    let changed = board.change_log(None).len().saturating_sub(changes_before);
    println!("✓ Score updated ({changed} field(s) changed)");
    if let Some(updated) = board.current().and_then(|t| t.team(&team_id)) {
        print_team_row(1, updated);
    }
    Ok(())
}
