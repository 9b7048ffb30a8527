//! Change log commands.

use super::{open, select, Scope};
use crate::error::CliResult;
use std::fs;
use std::path::Path;
use tracing::info;

/// Print the change log, or write it to `export` as JSON.
pub fn show(
    path: &Path,
    scope: &Scope,
    editor_filter: Option<&str>,
    export: Option<&Path>,
) -> CliResult<()> {
    let mut board = open(path, None)?;
    if scope.tournament.is_some() || scope.share.is_some() {
        select(&mut board, scope)?;
    }

    if let Some(output) = export {
        info!("Exporting change log to {:?}", output);
        let document = board.export_change_log();
        fs::write(output, serde_json::to_string_pretty(&document)?)?;
        println!("✓ Exported {} change(s) to {:?}", document.total_changes, output);
        return Ok(());
    }

    let entries = board.change_log(editor_filter);
    println!("Audit log ({})", entries.len());
    let editors = board.change_log_editors();
    if !editors.is_empty() {
        println!("  Editors: {}", editors.join(", "));
    }
    for entry in entries {
        println!(
            "  {}  {:<12} {:<18} {:<16} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.admin_name,
            entry.action,
            entry.tournament_name,
            entry.description
        );
    }
    Ok(())
}

/// Empty the change log.
pub fn clear(path: &Path) -> CliResult<()> {
    info!("Clearing change log");
    let mut board = open(path, None)?;
    let removed = board.change_log(None).len();
    board.clear_change_log();
    println!("✓ Cleared {removed} change(s)");
    Ok(())
}
