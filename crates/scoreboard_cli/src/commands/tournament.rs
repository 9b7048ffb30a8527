//! Tournament lifecycle commands.

use super::{open, print_team_row, select, Scope};
use crate::error::{applied, CliError, CliResult};
use scoreboard_core::TournamentId;
use std::path::Path;
use tracing::info;

/// Create a tournament and print its id and share code.
pub fn create(path: &Path, editor: Option<&str>, name: &str) -> CliResult<()> {
    info!("Creating tournament {:?}", name);
    let mut board = open(path, editor)?;
    applied(board.create_tournament(name))?;

    let tournament = board
        .current()
        .ok_or_else(|| CliError::usage("tournament was not created"))?;
    println!("✓ Tournament created");
    println!("  Name: {}", tournament.name);
    println!("  Id: {}", tournament.id);
    if let Some(code) = &tournament.share_code {
        println!("  Share code: {code}");
    }
    Ok(())
}

/// List every tournament.
pub fn list(path: &Path) -> CliResult<()> {
    let board = open(path, None)?;
    if board.tournaments().is_empty() {
        println!("No tournaments");
        return Ok(());
    }

    println!("Tournaments");
    println!("===========");
    for t in board.tournaments() {
        println!(
            "  {}  {:<24} teams: {:>3}  keys: {:>2}  share: {}  created: {}",
            t.id,
            t.name,
            t.teams.len(),
            t.auth_keys.len(),
            t.share_code.as_deref().unwrap_or("-"),
            t.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Print the ranking of one tournament.
pub fn teams(path: &Path, scope: &Scope) -> CliResult<()> {
    let mut board = open(path, None)?;
    select(&mut board, scope)?;

    let ranking = board.sorted_teams();
    if let Some(current) = board.current() {
        println!("{}", current.name);
        println!("{}", "=".repeat(current.name.chars().count()));
    }
    if ranking.is_empty() {
        println!("  No teams");
    }
    for (i, team) in ranking.iter().enumerate() {
        print_team_row(i + 1, team);
    }
    Ok(())
}

/// Delete a tournament.
pub fn delete(path: &Path, editor: Option<&str>, id: &str) -> CliResult<()> {
    info!("Deleting tournament {}", id);
    let mut board = open(path, editor)?;
    applied(board.delete_tournament(&TournamentId::from(id)))?;
    println!("✓ Tournament deleted");
    Ok(())
}

/// Show the share code, or generate a new one.
///
/// A generated code lives only in this process until the tournament is
/// next modified, so it is printed but not saved.
pub fn share_code(path: &Path, scope: &Scope, regenerate: bool) -> CliResult<()> {
    let mut board = open(path, None)?;
    select(&mut board, scope)?;

    if regenerate {
        let code = board.generate_share_code()?;
        println!("New share code: {code}");
        println!("  (not saved until the tournament is next modified)");
        return Ok(());
    }

    match board.current().and_then(|t| t.share_code.as_deref()) {
        Some(code) => println!("Share code: {code}"),
        None => println!("No share code"),
    }
    Ok(())
}
