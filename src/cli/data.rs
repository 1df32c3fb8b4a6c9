use clap::Subcommand;
use std::fs;
use std::path::PathBuf;

use super::{CliError, require_confirmation};
use crate::models::{TaskView, Theme};
use crate::store::SettingsUpdate;
use crate::utils::format_duration;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long, value_enum)]
        theme: Option<Theme>,
        /// Accent color as a hex string
        #[arg(long)]
        accent_color: Option<String>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        compact: Option<bool>,
        #[arg(long)]
        show_completed: Option<bool>,
        #[arg(long, value_enum)]
        default_view: Option<TaskView>,
    },
    /// Switch between the light and dark themes
    ToggleTheme,
}

pub fn handle_settings(command: SettingsCommand, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        SettingsCommand::Show => {}
        SettingsCommand::Set {
            theme,
            accent_color,
            sound,
            notifications,
            compact,
            show_completed,
            default_view,
        } => {
            ws.settings.update(SettingsUpdate {
                theme,
                accent_color,
                sound_enabled: sound,
                notifications_enabled: notifications,
                compact_mode: compact,
                show_completed_tasks: show_completed,
                default_task_view: default_view,
            });
            println!("Settings updated");
        }
        SettingsCommand::ToggleTheme => {
            let theme = ws.settings.toggle_theme();
            println!("Theme set to {}", theme.as_str());
        }
    }

    let settings = ws.settings.settings();
    println!("theme:                {}", settings.theme.as_str());
    println!(
        "display:              {}",
        if ws.settings.is_dark() { "dark" } else { "light" }
    );
    println!("accent color:         {}", settings.accent_color);
    println!("sound:                {}", settings.sound_enabled);
    println!("notifications:        {}", settings.notifications_enabled);
    println!("compact mode:         {}", settings.compact_mode);
    println!("show completed tasks: {}", settings.show_completed_tasks);
    println!("default task view:    {}", settings.default_task_view.as_str());
    Ok(())
}

/// Handle the stats command
pub fn handle_stats(ws: &Workspace) -> Result<(), CliError> {
    let stats = ws.dashboard();
    println!(
        "Tasks:      {} total, {} completed, {} in progress, {} overdue",
        stats.total_tasks, stats.completed_tasks, stats.in_progress_tasks, stats.overdue_tasks
    );
    println!("Completion: {}%", stats.completion_rate);
    println!(
        "Completed:  {} today, {} this week, {} this month",
        stats.completed_today, stats.completed_this_week, stats.completed_this_month
    );
    println!("Notes:      {}", stats.total_notes);
    println!("Projects:   {} active", stats.active_projects);
    println!("Tracked:    {}", format_duration(stats.total_time_tracked));
    Ok(())
}

/// Handle the export command
pub fn handle_export(output: Option<PathBuf>, ws: &Workspace) -> Result<(), CliError> {
    let bundle = ws.export()?;
    match output {
        Some(path) => {
            fs::write(&path, bundle)
                .map_err(|e| CliError::IoError(format!("{}: {}", path.display(), e)))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", bundle),
    }
    Ok(())
}

/// Handle the import command
pub fn handle_import(file: PathBuf, yes: bool, ws: &mut Workspace) -> Result<(), CliError> {
    let text = fs::read_to_string(&file)
        .map_err(|e| CliError::IoError(format!("{}: {}", file.display(), e)))?;
    require_confirmation(yes, "Importing replaces the stored collections")?;

    if !ws.import(&text) {
        return Err(CliError::ImportError(format!(
            "{} is not a valid backup or could not be written",
            file.display()
        )));
    }
    println!(
        "Imported {} tasks, {} notes, {} projects, {} sessions",
        ws.tasks.all().len(),
        ws.notes.all().len(),
        ws.projects.all().len(),
        ws.timer.all().len()
    );
    Ok(())
}

/// Handle the clear command
pub fn handle_clear(yes: bool, ws: &mut Workspace) -> Result<(), CliError> {
    require_confirmation(yes, "This deletes all tasks, notes, projects, sessions and settings")?;
    ws.clear_all()?;
    println!("All data cleared");
    Ok(())
}
