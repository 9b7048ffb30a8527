//! Scoreboard CLI
//!
//! Command-line tools for a Scoreboard data directory.
//!
//! # Commands
//!
//! - `create`, `list`, `delete` - Manage tournaments
//! - `teams`, `add-team`, `remove-team`, `score` - Manage teams and counters
//! - `share-code`, `keys` - Viewer access and auth keys
//! - `backups`, `restore` - Automatic backup history
//! - `audit`, `audit-clear` - Change log
//! - `export`, `import`, `reset` - Whole-state operations

mod commands;
mod error;

use clap::{Args, Parser, Subcommand};
use commands::Scope;
use error::CliError;
use scoreboard_core::ScoreUpdate;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scoreboard command-line tools.
#[derive(Parser)]
#[command(name = "scoreboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Sign in as this editor (omit to act as a viewer)
    #[arg(global = true, short, long)]
    editor: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tournament
    Create {
        /// Tournament name
        name: String,
    },

    /// List tournaments
    List,

    /// Show the ranking of a tournament
    Teams {
        #[command(flatten)]
        scope: Scope,
    },

    /// Add a team
    AddTeam {
        #[command(flatten)]
        scope: Scope,

        /// Team name
        name: String,
    },

    /// Remove a team
    RemoveTeam {
        #[command(flatten)]
        scope: Scope,

        /// Team id or name
        team: String,
    },

    /// Update a team's counters
    Score {
        #[command(flatten)]
        scope: Scope,

        /// Team id or name
        team: String,

        #[command(flatten)]
        counters: Counters,
    },

    /// Delete a tournament
    Delete {
        /// Tournament id
        id: String,
    },

    /// Show or regenerate a tournament's share code
    ShareCode {
        #[command(flatten)]
        scope: Scope,

        /// Generate a new code
        #[arg(short, long)]
        regenerate: bool,
    },

    /// Manage auth keys
    Keys {
        #[command(flatten)]
        scope: Scope,

        #[command(subcommand)]
        action: KeysAction,
    },

    /// List automatic backups
    Backups,

    /// Restore an automatic backup
    Restore {
        /// Backup index (0 is the newest)
        index: usize,
    },

    /// Show or export the change log
    Audit {
        #[command(flatten)]
        scope: Scope,

        /// Only show changes by this editor
        #[arg(long)]
        editor_filter: Option<String>,

        /// Write the change log to this file as JSON
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Clear the change log
    AuditClear,

    /// Export every tournament
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a timestamped full backup instead
        #[arg(long)]
        full: bool,
    },

    /// Replace every tournament with an export
    Import {
        /// Export file to read
        input: PathBuf,
    },

    /// Delete every tournament
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum KeysAction {
    /// Issue a key
    Issue {
        /// User the key is for
        username: String,
    },
    /// Revoke a key
    Revoke {
        /// Key id
        key_id: String,
    },
    /// List keys
    List,
}

/// Counter values to set. Omitted counters are left unchanged.
#[derive(Args)]
struct Counters {
    /// Rounds played
    #[arg(long, allow_negative_numbers = true)]
    rounds: Option<f64>,

    /// Wins
    #[arg(long, allow_negative_numbers = true)]
    wins: Option<f64>,

    /// Losses
    #[arg(long, allow_negative_numbers = true)]
    losses: Option<f64>,

    /// Points
    #[arg(long, allow_negative_numbers = true)]
    points: Option<f64>,
}

impl From<Counters> for ScoreUpdate {
    fn from(counters: Counters) -> Self {
        Self {
            rounds: counters.rounds,
            wins: counters.wins,
            losses: counters.losses,
            points: counters.points,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("Scoreboard CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Scoreboard Core v{}", scoreboard_core::VERSION);
        return Ok(());
    }

    let path = cli
        .path
        .ok_or_else(|| CliError::usage("Data directory required (--path)"))?;
    let editor = cli.editor.as_deref();

    match cli.command {
        Commands::Create { name } => commands::tournament::create(&path, editor, &name)?,
        Commands::List => commands::tournament::list(&path)?,
        Commands::Teams { scope } => commands::tournament::teams(&path, &scope)?,
        Commands::AddTeam { scope, name } => commands::team::add(&path, editor, &scope, &name)?,
        Commands::RemoveTeam { scope, team } => {
            commands::team::remove(&path, editor, &scope, &team)?;
        }
        Commands::Score {
            scope,
            team,
            counters,
        } => commands::team::score(&path, editor, &scope, &team, counters.into())?,
        Commands::Delete { id } => commands::tournament::delete(&path, editor, &id)?,
        Commands::ShareCode { scope, regenerate } => {
            commands::tournament::share_code(&path, &scope, regenerate)?;
        }
        Commands::Keys { scope, action } => match action {
            KeysAction::Issue { username } => {
                commands::keys::issue(&path, editor, &scope, &username)?;
            }
            KeysAction::Revoke { key_id } => commands::keys::revoke(&path, &scope, &key_id)?,
            KeysAction::List => commands::keys::list(&path, &scope)?,
        },
        Commands::Backups => commands::backup::list(&path)?,
        Commands::Restore { index } => commands::backup::restore(&path, index)?,
        Commands::Audit {
            scope,
            editor_filter,
            export,
        } => commands::audit::show(&path, &scope, editor_filter.as_deref(), export.as_deref())?,
        Commands::AuditClear => commands::audit::clear(&path)?,
        Commands::Export { output, full } => {
            commands::data::export(&path, output.as_deref(), full)?;
        }
        Commands::Import { input } => commands::data::import(&path, &input)?,
        Commands::Reset { yes } => commands::data::reset(&path, editor, yes)?,
        Commands::Version => {}
    }

    Ok(())
}
