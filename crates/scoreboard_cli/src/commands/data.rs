//! Export, import and reset commands.

use super::open;
use crate::error::{applied, CliError, CliResult};
use std::fs;
use std::path::Path;
use tracing::info;

/// Write every tournament to `output`, or to stdout.
///
/// `full` selects the timestamped backup document instead of the
/// versioned export.
pub fn export(path: &Path, output: Option<&Path>, full: bool) -> CliResult<()> {
    let board = open(path, None)?;
    let text = if full {
        board.export_full_backup()?
    } else {
        board.export_data()?
    };

    match output {
        Some(output) => {
            info!("Exporting to {:?}", output);
            fs::write(output, text)?;
            println!(
                "✓ Exported {} tournament(s) to {:?}",
                board.tournaments().len(),
                output
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Replace every tournament with the contents of `input`.
pub fn import(path: &Path, input: &Path) -> CliResult<()> {
    info!("Importing from {:?}", input);
    let text = fs::read_to_string(input)?;
    let mut board = open(path, None)?;
    applied(board.import_data(&text))?;
    println!("✓ Imported {} tournament(s)", board.tournaments().len());
    Ok(())
}

/// Delete every tournament. Requires `yes`.
pub fn reset(path: &Path, editor: Option<&str>, yes: bool) -> CliResult<()> {
    if !yes {
        return Err(CliError::usage(
            "reset deletes every tournament. Use --yes to confirm.",
        ));
    }
    info!("Resetting all tournaments");
    let mut board = open(path, editor)?;
    applied(board.reset())?;
    println!("✓ All tournaments deleted");
    Ok(())
}
