use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils;

/// Colors handed out to projects created without an explicit color
pub const PROJECT_PALETTE: [&str; 8] = [
    "#3b82f6", // blue
    "#8b5cf6", // purple
    "#ec4899", // pink
    "#f59e0b", // amber
    "#10b981", // green
    "#06b6d4", // cyan
    "#f43f5e", // rose
    "#6366f1", // indigo
];

pub const DEFAULT_PROJECT_ICON: &str = "📁";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    #[default]
    General,
    Idea,
    Meeting,
    Documentation,
    Reference,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Archived => "archived",
        }
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl NoteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::General => "general",
            NoteCategory::Idea => "idea",
            NoteCategory::Meeting => "meeting",
            NoteCategory::Documentation => "documentation",
            NoteCategory::Reference => "reference",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the display's dark-mode preference
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    #[default]
    List,
    Board,
    Calendar,
}

impl Theme {
    /// Whether this theme renders dark, given the platform preference
    pub fn is_dark(self, prefers_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::Auto => prefers_dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl TaskView {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskView::List => "list",
            TaskView::Board => "board",
            TaskView::Calendar => "calendar",
        }
    }
}

/// The single settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: Theme,
    pub accent_color: String,
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    pub compact_mode: bool,
    pub show_completed_tasks: bool,
    pub default_task_view: TaskView,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            accent_color: "#3b82f6".to_string(),
            sound_enabled: true,
            notifications_enabled: true,
            compact_mode: false,
            show_completed_tasks: true,
            default_task_view: TaskView::List,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped by toggling to completed, cleared by toggling back
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_time: Option<u32>, // minutes
    #[serde(default)]
    pub time_spent: Option<u32>, // minutes
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: NoteCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSession {
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds; only meaningful once `end_time` is set
    pub duration: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub project_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_time: Option<u32>,
    pub time_spent: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub category: NoteCategory,
    pub tags: Vec<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    /// Picked from [`PROJECT_PALETTE`] when absent
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl NewNote {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl NewSession {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

impl Task {
    pub fn new(fields: NewTask, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: utils::generate_id(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            tags: fields.tags,
            project_id: fields.project_id,
            due_date: fields.due_date,
            created_at: now,
            updated_at: now,
            completed_at: fields.completed_at,
            estimated_time: fields.estimated_time,
            time_spent: fields.time_spent,
            order,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl Note {
    pub fn new(fields: NewNote) -> Self {
        let now = Utc::now();
        Self {
            id: utils::generate_id(),
            title: fields.title,
            content: fields.content,
            category: fields.category,
            tags: fields.tags,
            project_id: fields.project_id,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Project {
    pub fn new(fields: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: utils::generate_id(),
            name: fields.name,
            description: fields.description,
            color: fields
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| utils::random_color().to_string()),
            icon: fields
                .icon
                .unwrap_or_else(|| DEFAULT_PROJECT_ICON.to_string()),
            created_at: now,
            updated_at: now,
            is_archived: false,
        }
    }
}

impl TimeSession {
    /// A fresh, still running session starting now
    pub fn start(fields: NewSession) -> Self {
        let now = Utc::now();
        Self {
            id: utils::generate_id(),
            task_id: fields.task_id,
            project_id: fields.project_id,
            description: fields.description,
            tags: fields.tags,
            start_time: now,
            end_time: None,
            duration: 0,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(NewTask::new("Write report"), 0);

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.order, 0);
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_at, task.updated_at);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_project_color_falls_back_to_palette() {
        let project = Project::new(NewProject::new("Home"));
        assert!(PROJECT_PALETTE.contains(&project.color.as_str()));
        assert_eq!(project.icon, DEFAULT_PROJECT_ICON);
        assert!(!project.is_archived);

        let mut fields = NewProject::new("Work");
        fields.color = Some("#000000".to_string());
        assert_eq!(Project::new(fields).color, "#000000");
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Note::new(NewNote::new("a"));
        let b = Note::new(NewNote::new("b"));
        assert_ne!(a.id, b.id);
        assert!(!a.is_pinned);
    }
}
