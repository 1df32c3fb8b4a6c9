use clap::Subcommand;

use super::{CliError, print_id_line, require_confirmation, resolve_id};
use crate::models::{NewProject, Project};
use crate::query;
use crate::store::ProjectUpdate;
use crate::utils::{format_duration, short_id};
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Add a new project
    Add {
        /// Project name
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Hex color; a palette color is picked when omitted
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// List projects with their task progress
    List {
        /// Show archived projects instead of active ones
        #[arg(long)]
        archived: bool,
    },
    /// Show one project with its statistics
    Show { id: String },
    /// Change fields of a project
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Hide a project from the active list
    Archive { id: String },
    /// Return an archived project to the active list
    Unarchive { id: String },
    /// Delete a project; its tasks keep their (now dangling) reference
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle(command: ProjectCommand, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        ProjectCommand::Add {
            name,
            description,
            color,
            icon,
        } => {
            let id = ws.projects.add(NewProject {
                name,
                description: description.unwrap_or_default(),
                color,
                icon,
            });
            print_id_line("Project", &id);
            Ok(())
        }
        ProjectCommand::List { archived } => handle_list_projects(archived, ws),
        ProjectCommand::Show { id } => handle_show_project(&id, ws),
        ProjectCommand::Edit {
            id,
            name,
            description,
            color,
            icon,
        } => {
            let id = resolve_id(ws.projects.all(), "project", &id)?;
            ws.projects.update(
                &id,
                ProjectUpdate {
                    name,
                    description,
                    color,
                    icon,
                    is_archived: None,
                },
            );
            println!("Project updated (ID: {})", short_id(&id));
            Ok(())
        }
        ProjectCommand::Archive { id } => {
            let id = resolve_id(ws.projects.all(), "project", &id)?;
            ws.projects.archive(&id);
            println!("Project archived (ID: {})", short_id(&id));
            Ok(())
        }
        ProjectCommand::Unarchive { id } => {
            let id = resolve_id(ws.projects.all(), "project", &id)?;
            ws.projects.unarchive(&id);
            println!("Project restored (ID: {})", short_id(&id));
            Ok(())
        }
        ProjectCommand::Delete { id, yes } => handle_delete_project(&id, yes, ws),
    }
}

/// Handle the project list command
pub fn handle_list_projects(archived: bool, ws: &Workspace) -> Result<(), CliError> {
    let projects = if archived {
        ws.projects.archived()
    } else {
        ws.projects.active()
    };
    if projects.is_empty() {
        println!("No projects found");
    }
    for project in projects {
        print_project_line(project, ws);
    }
    Ok(())
}

/// Handle the project show command
pub fn handle_show_project(id: &str, ws: &Workspace) -> Result<(), CliError> {
    let id = resolve_id(ws.projects.all(), "project", id)?;
    let Some(project) = ws.projects.get(&id) else {
        return Err(CliError::NotFound { kind: "project", id });
    };
    let stats = query::project_task_stats(ws.tasks.all(), &project.id);

    println!("{} {}", project.icon, project.name);
    println!("  id:          {}", project.id);
    println!("  color:       {}", project.color);
    if project.is_archived {
        println!("  archived:    yes");
    }
    println!(
        "  tasks:       {} total, {} completed, {} in progress ({}%)",
        stats.total, stats.completed, stats.in_progress, stats.percentage
    );
    println!(
        "  tracked:     {}",
        format_duration(ws.timer.total_time_for_project(&project.id))
    );
    println!("  sessions:    {}", query::sessions_for_project(ws.timer.all(), &project.id).len());
    if !project.description.is_empty() {
        println!();
        println!("{}", project.description);
    }

    let tasks = query::tasks_for_project(ws.tasks.all(), &project.id);
    if !tasks.is_empty() {
        println!();
        for task in tasks {
            println!("  [{}] {}  {}", task.status, short_id(&task.id), task.title);
        }
    }
    Ok(())
}

/// Handle the project delete command. Tasks are not touched.
pub fn handle_delete_project(id: &str, yes: bool, ws: &mut Workspace) -> Result<(), CliError> {
    let id = resolve_id(ws.projects.all(), "project", id)?;
    let task_count = query::tasks_for_project(ws.tasks.all(), &id).len();
    let message = if task_count > 0 {
        format!("This project has {} task(s). Delete it", task_count)
    } else {
        "Delete this project".to_string()
    };
    require_confirmation(yes, message)?;

    ws.projects.remove(&id);
    println!("Project deleted (ID: {})", short_id(&id));
    Ok(())
}

fn print_project_line(project: &Project, ws: &Workspace) {
    let stats = query::project_task_stats(ws.tasks.all(), &project.id);
    println!(
        "{} {} {}  {}/{} tasks ({}%)  {}",
        short_id(&project.id),
        project.icon,
        project.name,
        stats.completed,
        stats.total,
        stats.percentage,
        format_duration(ws.timer.total_time_for_project(&project.id))
    );
}
