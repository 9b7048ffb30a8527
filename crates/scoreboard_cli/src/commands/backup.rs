//! Backup history and restore commands.

use super::open;
use crate::error::{applied, CliResult};
use std::path::Path;
use tracing::info;

/// List automatic backups, newest first.
pub fn list(path: &Path) -> CliResult<()> {
    let board = open(path, None)?;
    let history = board.backup_history();
    println!(
        "Backups ({}/{})",
        history.len(),
        board.config().max_backups
    );
    for (index, record) in history.iter().enumerate() {
        println!(
            "  [{index:>2}] {}  {:<24} teams: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.tournament_name,
            record.teams_count
        );
    }
    Ok(())
}

/// Restore the backup at `index`.
pub fn restore(path: &Path, index: usize) -> CliResult<()> {
    info!("Restoring backup {}", index);
    let mut board = open(path, None)?;
    applied(board.restore_backup(index))?;

    if let Some(restored) = board.current() {
        println!("✓ Backup restored");
        println!("  Tournament: {} ({})", restored.name, restored.id);
        println!("  Teams: {}", restored.teams.len());
    }
    Ok(())
}
