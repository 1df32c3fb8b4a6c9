pub mod data;
pub mod notes;
pub mod projects;
pub mod tasks;
pub mod timer;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;
use crate::store::Record;
use crate::utils::{parse_date, short_id};
use crate::workspace::Workspace;

pub use data::SettingsCommand;
pub use notes::NoteCommand;
pub use projects::ProjectCommand;
pub use tasks::TaskCommand;
pub use timer::TimerCommand;

#[derive(Parser)]
#[command(name = "desk")]
#[command(about = "Tasks, notes, projects and time tracking, stored locally")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Track time
    #[command(subcommand)]
    Timer(TimerCommand),
    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Show dashboard statistics
    Stats,
    /// Write every collection to a JSON backup
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore collections from a JSON backup, replacing current data
    Import {
        /// Backup file produced by `export`
        file: PathBuf,
        /// Confirm overwriting existing data
        #[arg(long)]
        yes: bool,
    },
    /// Delete all stored data
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("No {kind} matches id '{id}'")]
    NotFound { kind: &'static str, id: String },
    #[error("Id '{id}' matches {count} {kind}s; use more characters")]
    AmbiguousId {
        kind: &'static str,
        id: String,
        count: usize,
    },
    #[error("{0}; re-run with --yes to confirm")]
    ConfirmationRequired(String),
    #[error("No session is running")]
    NoActiveSession,
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Import failed: {0}")]
    ImportError(String),
}

/// Dispatch a parsed command against the workspace
pub fn run(command: Commands, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        Commands::Task(cmd) => tasks::handle(cmd, ws),
        Commands::Note(cmd) => notes::handle(cmd, ws),
        Commands::Project(cmd) => projects::handle(cmd, ws),
        Commands::Timer(cmd) => timer::handle(cmd, ws),
        Commands::Settings(cmd) => data::handle_settings(cmd, ws),
        Commands::Stats => data::handle_stats(ws),
        Commands::Export { output } => data::handle_export(output, ws),
        Commands::Import { file, yes } => data::handle_import(file, yes, ws),
        Commands::Clear { yes } => data::handle_clear(yes, ws),
    }
}

/// Find the full id of the single record whose id starts with `prefix`.
/// An exact match always wins.
pub fn resolve_id<T: Record>(items: &[T], kind: &'static str, prefix: &str) -> Result<String, CliError> {
    let prefix = prefix.trim();
    if let Some(exact) = items.iter().find(|item| item.id() == prefix) {
        return Ok(exact.id().to_string());
    }

    let matches: Vec<&T> = if prefix.is_empty() {
        Vec::new()
    } else {
        items.iter().filter(|item| item.id().starts_with(prefix)).collect()
    };
    match matches.as_slice() {
        [only] => Ok(only.id().to_string()),
        [] => Err(CliError::NotFound {
            kind,
            id: prefix.to_string(),
        }),
        _ => Err(CliError::AmbiguousId {
            kind,
            id: prefix.to_string(),
            count: matches.len(),
        }),
    }
}

fn parse_due(raw: &str) -> Result<NaiveDate, CliError> {
    parse_date(raw)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", raw, e)))
}

fn require_confirmation(yes: bool, message: impl Into<String>) -> Result<(), CliError> {
    if yes {
        Ok(())
    } else {
        Err(CliError::ConfirmationRequired(message.into()))
    }
}

fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

fn print_id_line(kind: &str, id: &str) {
    println!("{} created successfully (ID: {})", kind, short_id(id));
}
