use chrono::Local;
use clap::Subcommand;

use super::{CliError, parse_due, print_id_line, require_confirmation, resolve_id, tag_list};
use crate::models::{NewTask, Task, TaskPriority, TaskStatus};
use crate::query::{self, TaskFilter};
use crate::store::TaskUpdate;
use crate::utils::{format_duration, parse_tags, short_id};
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a new task
    Add {
        /// Task title
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_enum)]
        priority: Option<TaskPriority>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
    },
    /// List tasks in manual order
    List {
        /// Only these statuses (comma-separated)
        #[arg(long, value_enum, value_delimiter = ',')]
        status: Vec<TaskStatus>,
        /// Only these priorities (comma-separated)
        #[arg(long, value_enum, value_delimiter = ',')]
        priority: Vec<TaskPriority>,
        /// Project id or prefix
        #[arg(long)]
        project: Option<String>,
        /// Any of these tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
        /// Due on or after (YYYY-MM-DD)
        #[arg(long)]
        due_from: Option<String>,
        /// Due on or before (YYYY-MM-DD)
        #[arg(long)]
        due_to: Option<String>,
        /// Include completed tasks even when settings hide them
        #[arg(short, long)]
        all: bool,
    },
    /// Show the most recently updated tasks
    Recent {
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Show one task in full
    Show { id: String },
    /// Change fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(short, long, value_enum)]
        priority: Option<TaskPriority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        /// Project id or prefix
        #[arg(long, conflicts_with = "no_project")]
        project: Option<String>,
        /// Detach from its project
        #[arg(long)]
        no_project: bool,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,
        /// Minutes spent so far
        #[arg(long)]
        spent: Option<u32>,
    },
    /// Flip between todo and completed
    Toggle { id: String },
    /// Move a task to a position in the manual order (0-based)
    Move { id: String, position: usize },
    /// Delete a task
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle(command: TaskCommand, ws: &mut Workspace) -> Result<(), CliError> {
    match command {
        TaskCommand::Add {
            title,
            description,
            priority,
            status,
            due,
            tags,
            project,
            estimate,
        } => {
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            let fields = NewTask {
                title,
                description: description.unwrap_or_default(),
                status: status.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                project_id,
                due_date: due.as_deref().map(parse_due).transpose()?,
                estimated_time: estimate,
                ..NewTask::default()
            };
            handle_add_task(fields, ws)
        }
        TaskCommand::List {
            status,
            priority,
            project,
            tag,
            search,
            due_from,
            due_to,
            all,
        } => {
            let project_id = project
                .map(|p| resolve_id(ws.projects.all(), "project", &p))
                .transpose()?;
            let filter = TaskFilter {
                statuses: Some(status),
                priorities: Some(priority),
                project_id,
                tags: Some(tag),
                search,
                due_from: due_from.as_deref().map(parse_due).transpose()?,
                due_to: due_to.as_deref().map(parse_due).transpose()?,
            };
            handle_list_tasks(filter, all, ws)
        }
        TaskCommand::Recent { limit } => {
            for task in query::recent_tasks(ws.tasks.all(), limit) {
                print_task_line(task, ws);
            }
            Ok(())
        }
        TaskCommand::Show { id } => handle_show_task(&id, ws),
        TaskCommand::Edit {
            id,
            title,
            description,
            status,
            priority,
            due,
            clear_due,
            tags,
            project,
            no_project,
            estimate,
            spent,
        } => {
            let id = resolve_id(ws.tasks.all(), "task", &id)?;
            let project_id = if no_project {
                Some(None)
            } else {
                project
                    .map(|p| resolve_id(ws.projects.all(), "project", &p).map(Some))
                    .transpose()?
            };
            let due_date = if clear_due {
                Some(None)
            } else {
                due.as_deref().map(parse_due).transpose()?.map(Some)
            };
            let update = TaskUpdate {
                title,
                description,
                status,
                priority,
                tags: tags.as_deref().map(parse_tags),
                project_id,
                due_date,
                estimated_time: estimate.map(Some),
                time_spent: spent.map(Some),
                ..TaskUpdate::default()
            };
            ws.tasks.update(&id, update);
            println!("Task updated (ID: {})", short_id(&id));
            Ok(())
        }
        TaskCommand::Toggle { id } => handle_toggle_task(&id, ws),
        TaskCommand::Move { id, position } => {
            let id = resolve_id(ws.tasks.all(), "task", &id)?;
            ws.tasks.move_to(&id, position);
            println!("Task moved to position {}", position.min(ws.tasks.all().len().saturating_sub(1)));
            Ok(())
        }
        TaskCommand::Delete { id, yes } => {
            let id = resolve_id(ws.tasks.all(), "task", &id)?;
            let title = ws.tasks.get(&id).map(|t| t.title.clone()).unwrap_or_default();
            require_confirmation(yes, format!("Delete task '{}'", title))?;
            ws.tasks.remove(&id);
            println!("Task deleted (ID: {})", short_id(&id));
            Ok(())
        }
    }
}

/// Handle the task add command
pub fn handle_add_task(fields: NewTask, ws: &mut Workspace) -> Result<(), CliError> {
    let id = ws.tasks.add(fields);
    print_id_line("Task", &id);
    Ok(())
}

/// Handle the task list command
pub fn handle_list_tasks(filter: TaskFilter, all: bool, ws: &mut Workspace) -> Result<(), CliError> {
    ws.tasks.set_filters(filter);

    let tasks = visible_tasks(ws, all);
    if tasks.is_empty() {
        println!("No tasks found");
    }
    for task in tasks {
        print_task_line(task, ws);
    }
    Ok(())
}

/// Tasks passing the store filters. Completed tasks are hidden when the
/// settings say so, unless `all` is set or a status filter is in place.
fn visible_tasks(ws: &Workspace, all: bool) -> Vec<&Task> {
    let by_status = ws
        .tasks
        .filters()
        .statuses
        .as_ref()
        .is_some_and(|statuses| !statuses.is_empty());
    let hide_completed = !all && !by_status && !ws.settings.settings().show_completed_tasks;

    ws.tasks
        .filtered()
        .into_iter()
        .filter(|t| !(hide_completed && t.is_completed()))
        .collect()
}

/// Handle the task show command
pub fn handle_show_task(id: &str, ws: &Workspace) -> Result<(), CliError> {
    let id = resolve_id(ws.tasks.all(), "task", id)?;
    let Some(task) = ws.tasks.get(&id) else {
        return Err(CliError::NotFound { kind: "task", id });
    };

    println!("{}", task.title);
    println!("  id:        {}", task.id);
    println!("  status:    {}", task.status);
    println!("  priority:  {}", task.priority);
    println!(
        "  project:   {}",
        query::project_label(ws.projects.all(), task.project_id.as_deref())
    );
    if let Some(due) = task.due_date {
        println!("  due:       {}", due);
    }
    if !task.tags.is_empty() {
        println!("  tags:      {}", task.tags.join(", "));
    }
    if let Some(estimate) = task.estimated_time {
        println!("  estimate:  {}m", estimate);
    }
    if let Some(spent) = task.time_spent {
        println!("  spent:     {}m", spent);
    }
    let tracked = ws.timer.total_time_for_task(&task.id);
    if tracked > 0 {
        println!("  tracked:   {}", format_duration(tracked));
    }
    if let Some(completed_at) = task.completed_at {
        println!("  completed: {}", completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
    println!("  created:   {}", task.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!("  updated:   {}", task.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    Ok(())
}

/// Handle the task toggle command
pub fn handle_toggle_task(id: &str, ws: &mut Workspace) -> Result<(), CliError> {
    let id = resolve_id(ws.tasks.all(), "task", id)?;
    if ws.tasks.toggle_status(&id) {
        let status = ws.tasks.get(&id).map(|t| t.status).unwrap_or_default();
        println!("Task is now {}", status);
    } else {
        let status = ws.tasks.get(&id).map(|t| t.status).unwrap_or_default();
        println!("Task is {}; only todo and completed tasks can be toggled", status);
    }
    Ok(())
}

fn print_task_line(task: &Task, ws: &Workspace) {
    let today = Local::now().date_naive();
    let mark = match task.status {
        TaskStatus::Completed => "[x]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Archived => "[-]",
        TaskStatus::Todo => "[ ]",
    };
    let due = match task.due_date {
        Some(date) if query::is_overdue(task, today) => format!(", overdue {}", date),
        Some(date) if query::is_due_today(task, today) => format!(", due today {}", date),
        Some(date) => format!(", due {}", date),
        None => String::new(),
    };
    let project = task
        .project_id
        .as_deref()
        .map(|id| format!("  {}", query::project_label(ws.projects.all(), Some(id))))
        .unwrap_or_default();
    println!(
        "{} {}  {} ({}{}){}{}",
        mark,
        short_id(&task.id),
        task.title,
        task.priority,
        due,
        tag_list(&task.tags),
        project
    );
}
