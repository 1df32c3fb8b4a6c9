use chrono::{Local, Utc};
use clap::Subcommand;

use super::{CliError, require_confirmation, resolve_id, tag_list};
use crate::models::{NewSession, TimeSession};
use crate::query::{self, SessionFilter};
use crate::store::{SessionUpdate, TickOutcome, Ticker};
use crate::utils::{format_duration, parse_tags, short_id};
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum TimerCommand {
    /// Start a session, stopping any running one
    Start {
        /// What you are working on
        #[arg(short, long)]
        description: Option<String>,
        /// Task id or prefix
        #[arg(long)]
        task: Option<String>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Stop the running session and record it
    Stop,
    /// Show the running session
    Status,
    /// List recorded sessions, newest first
    Log {
        /// Task id or prefix
        #[arg(long)]
        task: Option<String>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
        /// Case-insensitive search over descriptions
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Change fields of a recorded session
    Edit {
        id: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        /// Task id or prefix
        #[arg(long)]
        task: Option<String>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a recorded session
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle(command: TimerCommand, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        TimerCommand::Start {
            description,
            task,
            project,
            tags,
        } => {
            let task_id = task
                .map(|t| resolve_id(ws.tasks.all(), "task", &t))
                .transpose()?;
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            handle_start(
                NewSession {
                    task_id,
                    project_id,
                    description: description.unwrap_or_default(),
                    tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                },
                ws,
            )
        }
        TimerCommand::Stop => handle_stop(ws),
        TimerCommand::Status => handle_status(ws),
        TimerCommand::Log {
            task,
            project,
            search,
        } => {
            let task_id = task
                .map(|t| resolve_id(ws.tasks.all(), "task", &t))
                .transpose()?;
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            ws.timer.set_filters(SessionFilter {
                task_id,
                project_id,
                search,
            });
            handle_log(ws)
        }
        TimerCommand::Edit {
            id,
            description,
            tags,
            task,
            project,
        } => {
            let id = resolve_id(ws.timer.all(), "session", &id)?;
            let task_id = task
                .map(|t| resolve_id(ws.tasks.all(), "task", &t).map(Some))
                .transpose()?;
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p).map(Some))
                .transpose()?;
            ws.timer.update(
                &id,
                SessionUpdate {
                    description,
                    tags: tags.as_deref().map(parse_tags),
                    task_id,
                    project_id,
                },
            );
            println!("Session updated (ID: {})", short_id(&id));
            Ok(())
        }
        TimerCommand::Delete { id, yes } => {
            let id = resolve_id(ws.timer.all(), "session", &id)?;
            require_confirmation(yes, "Delete this session")?;
            ws.timer.remove(&id);
            println!("Session deleted (ID: {})", short_id(&id));
            Ok(())
        }
    }
}

/// Handle the timer start command
pub fn handle_start(fields: NewSession, ws: &mut Workspace) -> Result<(), CliError> {
    if let Some(elapsed) = sync_elapsed(ws) {
        if let Some(previous) = ws.timer.active() {
            println!(
                "Stopped running session {} after {}",
                short_id(&previous.id),
                format_duration(elapsed)
            );
        }
    }
    let id = ws.timer.start(fields);
    println!("Timer started (ID: {})", short_id(&id));
    Ok(())
}

/// Handle the timer stop command
pub fn handle_stop(ws: &mut Workspace) -> Result<(), CliError> {
    sync_elapsed(ws);
    let session = ws.timer.stop().ok_or(CliError::NoActiveSession)?;
    println!(
        "Timer stopped: {} recorded (ID: {})",
        format_duration(session.duration),
        short_id(&session.id)
    );
    Ok(())
}

/// Handle the timer status command
pub fn handle_status(ws: &mut Workspace) -> Result<(), CliError> {
    let Some(elapsed) = sync_elapsed(ws) else {
        println!("No session is running");
        return Ok(());
    };
    let Some(session) = ws.timer.active() else {
        return Err(CliError::NoActiveSession);
    };

    println!("Running for {}", format_duration(elapsed));
    if !session.description.is_empty() {
        println!("  {}", session.description);
    }
    if session.task_id.is_some() {
        println!("  task:    {}", query::task_label(ws.tasks.all(), session.task_id.as_deref()));
    }
    if session.project_id.is_some() {
        println!(
            "  project: {}",
            query::project_label(ws.projects.all(), session.project_id.as_deref())
        );
    }
    println!("  started: {}", session.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    Ok(())
}

/// Handle the timer log command
pub fn handle_log(ws: &Workspace) -> Result<(), CliError> {
    let sessions = ws.timer.filtered();
    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }
    let total: u64 = sessions.iter().map(|s| s.duration).sum();
    for session in sessions {
        print_session_line(session, ws);
    }
    println!("Total: {}", format_duration(total));
    Ok(())
}

/// Bring the running session's elapsed counter up to the wall clock.
/// Returns the elapsed seconds, or `None` when idle.
fn sync_elapsed(ws: &mut Workspace) -> Option<u64> {
    let mut ticker = Ticker::acquire(&ws.timer)?;
    match ticker.tick(&mut ws.timer, Utc::now()) {
        TickOutcome::Running(elapsed) => Some(elapsed),
        TickOutcome::Stopped => None,
    }
}

fn print_session_line(session: &TimeSession, ws: &Workspace) {
    let label = match (session.task_id.as_deref(), session.project_id.as_deref()) {
        (Some(task_id), _) => format!("  {}", query::task_label(ws.tasks.all(), Some(task_id))),
        (None, Some(project_id)) => {
            format!("  {}", query::project_label(ws.projects.all(), Some(project_id)))
        }
        (None, None) => String::new(),
    };
    println!(
        "{} {}  {:>8}  {}{}{}",
        short_id(&session.id),
        session.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        format_duration(session.duration),
        session.description,
        tag_list(&session.tags),
        label
    );
}
