//! Filtering, ordering and aggregation over snapshots of the stores.
//!
//! Everything here is a pure function of its inputs. Cross-entity references
//! are plain ids; a miss resolves to `None` (or a fallback label), never an
//! error.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc, Weekday};

use crate::models::{Note, NoteCategory, Project, Task, TaskPriority, TaskStatus, TimeSession};
use crate::store::Record;

/// Task filter. Every present field narrows the result; an absent field or
/// an empty set imposes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub statuses: Option<Vec<TaskStatus>>,
    pub priorities: Option<Vec<TaskPriority>>,
    pub project_id: Option<String>,
    /// Match-any
    pub tags: Option<Vec<String>>,
    pub search: Option<String>,
    /// Inclusive lower bound on the due date
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound on the due date
    pub due_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    pub categories: Option<Vec<NoteCategory>>,
    pub project_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub search: Option<String>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub search: Option<String>,
}

fn set_matches<T: PartialEq>(wanted: &Option<Vec<T>>, value: &T) -> bool {
    match wanted {
        Some(set) if !set.is_empty() => set.contains(value),
        _ => true,
    }
}

fn id_matches(wanted: &Option<String>, value: Option<&str>) -> bool {
    match wanted.as_deref() {
        Some(id) if !id.is_empty() => value == Some(id),
        _ => true,
    }
}

fn any_tag_matches(wanted: &Option<Vec<String>>, tags: &[String]) -> bool {
    match wanted {
        Some(set) if !set.is_empty() => set.iter().any(|tag| tags.contains(tag)),
        _ => true,
    }
}

/// Lower-cased needle, or `None` when there is nothing to search for
fn search_needle(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl TaskFilter {
    /// Overlay the fields present in `other`
    pub fn merge(&mut self, other: TaskFilter) {
        if other.statuses.is_some() {
            self.statuses = other.statuses;
        }
        if other.priorities.is_some() {
            self.priorities = other.priorities;
        }
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.tags.is_some() {
            self.tags = other.tags;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
        if other.due_from.is_some() {
            self.due_from = other.due_from;
        }
        if other.due_to.is_some() {
            self.due_to = other.due_to;
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !set_matches(&self.statuses, &task.status)
            || !set_matches(&self.priorities, &task.priority)
            || !id_matches(&self.project_id, task.project_id.as_deref())
            || !any_tag_matches(&self.tags, &task.tags)
        {
            return false;
        }

        if let Some(needle) = search_needle(&self.search) {
            if !contains_ci(&task.title, &needle) && !contains_ci(&task.description, &needle) {
                return false;
            }
        }

        // A task without a due date fails any present bound
        if let Some(from) = self.due_from {
            if !task.due_date.is_some_and(|due| due >= from) {
                return false;
            }
        }
        if let Some(to) = self.due_to {
            if !task.due_date.is_some_and(|due| due <= to) {
                return false;
            }
        }

        true
    }
}

impl NoteFilter {
    pub fn merge(&mut self, other: NoteFilter) {
        if other.categories.is_some() {
            self.categories = other.categories;
        }
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.tags.is_some() {
            self.tags = other.tags;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
        if other.pinned.is_some() {
            self.pinned = other.pinned;
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        if !set_matches(&self.categories, &note.category)
            || !id_matches(&self.project_id, note.project_id.as_deref())
            || !any_tag_matches(&self.tags, &note.tags)
        {
            return false;
        }

        if let Some(pinned) = self.pinned {
            if note.is_pinned != pinned {
                return false;
            }
        }

        match search_needle(&self.search) {
            Some(needle) => {
                contains_ci(&note.title, &needle)
                    || contains_ci(&note.content, &needle)
                    || note.tags.iter().any(|tag| contains_ci(tag, &needle))
            }
            None => true,
        }
    }
}

impl SessionFilter {
    pub fn merge(&mut self, other: SessionFilter) {
        if other.task_id.is_some() {
            self.task_id = other.task_id;
        }
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
    }

    pub fn matches(&self, session: &TimeSession) -> bool {
        if !id_matches(&self.task_id, session.task_id.as_deref())
            || !id_matches(&self.project_id, session.project_id.as_deref())
        {
            return false;
        }
        match search_needle(&self.search) {
            Some(needle) => contains_ci(&session.description, &needle),
            None => true,
        }
    }
}

/// Matching tasks in ascending `order`; equal orders keep collection order
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let mut matched: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    matched.sort_by_key(|t| t.order);
    matched
}

/// Matching notes, pinned first, then most recently updated
pub fn filter_notes<'a>(notes: &'a [Note], filter: &NoteFilter) -> Vec<&'a Note> {
    let mut matched: Vec<&Note> = notes.iter().filter(|n| filter.matches(n)).collect();
    matched.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    matched
}

/// Matching sessions, newest start first
pub fn filter_sessions<'a>(sessions: &'a [TimeSession], filter: &SessionFilter) -> Vec<&'a TimeSession> {
    let mut matched: Vec<&TimeSession> = sessions.iter().filter(|s| filter.matches(s)).collect();
    matched.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    matched
}

/// The `limit` most recently updated tasks
pub fn recent_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut recent: Vec<&Task> = tasks.iter().collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(limit);
    recent
}

pub fn tasks_for_project<'a>(tasks: &'a [Task], project_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.project_id.as_deref() == Some(project_id))
        .collect()
}

// Reference resolution

/// Resolve a weak reference; a missing id or a dangling one gives `None`
pub fn resolve<'a, T: Record>(items: &'a [T], id: Option<&str>) -> Option<&'a T> {
    let id = id?;
    items.iter().find(|item| item.id() == id)
}

pub fn project_label(projects: &[Project], project_id: Option<&str>) -> String {
    match (project_id, resolve(projects, project_id)) {
        (_, Some(project)) => format!("{} {}", project.icon, project.name),
        (Some(_), None) => "Unknown project".to_string(),
        (None, None) => "No project".to_string(),
    }
}

pub fn task_label(tasks: &[Task], task_id: Option<&str>) -> String {
    match (task_id, resolve(tasks, task_id)) {
        (_, Some(task)) => task.title.clone(),
        (Some(_), None) => "Unknown task".to_string(),
        (None, None) => "No task".to_string(),
    }
}

// Aggregation

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Rounded completion percentage, 0 for an empty set
    pub percentage: u32,
}

/// `part / total` as a rounded percentage; 0 when `total` is 0
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn task_stats<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in tasks {
        stats.total += 1;
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Todo | TaskStatus::Archived => {}
        }
    }
    stats.percentage = percentage(stats.completed, stats.total);
    stats
}

pub fn project_task_stats(tasks: &[Task], project_id: &str) -> TaskStats {
    task_stats(
        tasks
            .iter()
            .filter(|t| t.project_id.as_deref() == Some(project_id)),
    )
}

pub fn sessions_for_task<'a>(sessions: &'a [TimeSession], task_id: &str) -> Vec<&'a TimeSession> {
    sessions
        .iter()
        .filter(|s| s.task_id.as_deref() == Some(task_id))
        .collect()
}

pub fn sessions_for_project<'a>(sessions: &'a [TimeSession], project_id: &str) -> Vec<&'a TimeSession> {
    sessions
        .iter()
        .filter(|s| s.project_id.as_deref() == Some(project_id))
        .collect()
}

/// Tracked seconds for a task; 0 when no session references it
pub fn total_time_for_task(sessions: &[TimeSession], task_id: &str) -> u64 {
    sessions_for_task(sessions, task_id)
        .iter()
        .map(|s| s.duration)
        .sum()
}

pub fn total_time_for_project(sessions: &[TimeSession], project_id: &str) -> u64 {
    sessions_for_project(sessions, project_id)
        .iter()
        .map(|s| s.duration)
        .sum()
}

pub fn total_time(sessions: &[TimeSession]) -> u64 {
    sessions.iter().map(|s| s.duration).sum()
}

// Dates

/// Due strictly before `today` and not completed
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.is_completed() && task.due_date.is_some_and(|due| due < today)
}

pub fn is_due_today(task: &Task, today: NaiveDate) -> bool {
    task.due_date == Some(today)
}

fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Weeks start on Sunday
fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    a.week(Weekday::Sun).first_day() == b.week(Weekday::Sun).first_day()
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    pub completed_today: usize,
    pub completed_this_week: usize,
    pub completed_this_month: usize,
    pub completion_rate: u32,
    pub total_notes: usize,
    /// Projects that are not archived
    pub active_projects: usize,
    pub total_time_tracked: u64,
}

/// Headline numbers across every store, with "today" in local time
pub fn dashboard_stats(
    tasks: &[Task],
    notes: &[Note],
    projects: &[Project],
    sessions: &[TimeSession],
    today: NaiveDate,
) -> DashboardStats {
    let stats = task_stats(tasks);
    let completed_dates: Vec<NaiveDate> = tasks
        .iter()
        .filter_map(|t| t.completed_at.map(local_date))
        .collect();

    DashboardStats {
        total_tasks: stats.total,
        completed_tasks: stats.completed,
        in_progress_tasks: stats.in_progress,
        overdue_tasks: tasks.iter().filter(|t| is_overdue(t, today)).count(),
        completed_today: completed_dates.iter().filter(|d| **d == today).count(),
        completed_this_week: completed_dates.iter().filter(|d| same_week(**d, today)).count(),
        completed_this_month: completed_dates.iter().filter(|d| same_month(**d, today)).count(),
        completion_rate: stats.percentage,
        total_notes: notes.len(),
        active_projects: projects.iter().filter(|p| !p.is_archived).count(),
        total_time_tracked: total_time(sessions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewNote, NewProject, NewSession, NewTask};
    use chrono::Duration;

    fn task(title: &str, status: TaskStatus, order: i64) -> Task {
        let mut fields = NewTask::new(title);
        fields.status = status;
        Task::new(fields, order)
    }

    fn session(task_id: Option<&str>, project_id: Option<&str>, duration: u64) -> TimeSession {
        let mut s = TimeSession::start(NewSession {
            task_id: task_id.map(str::to_string),
            project_id: project_id.map(str::to_string),
            description: "work".to_string(),
            tags: Vec::new(),
        });
        s.duration = duration;
        s.end_time = Some(s.start_time);
        s
    }

    #[test]
    fn test_status_filter_keeps_collection_order() {
        let tasks = vec![
            task("a", TaskStatus::Completed, 0),
            task("b", TaskStatus::Todo, 1),
            task("c", TaskStatus::InProgress, 2),
            task("d", TaskStatus::Completed, 3),
            task("e", TaskStatus::Archived, 4),
            task("f", TaskStatus::Completed, 5),
        ];
        let filter = TaskFilter {
            statuses: Some(vec![TaskStatus::Completed]),
            ..TaskFilter::default()
        };

        let titles: Vec<&str> = filter_tasks(&tasks, &filter)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "d", "f"]);
    }

    #[test]
    fn test_empty_filter_sorts_by_order_stably() {
        let tasks = vec![
            task("late", TaskStatus::Todo, 2),
            task("first-dup", TaskStatus::Todo, 1),
            task("second-dup", TaskStatus::Todo, 1),
            task("early", TaskStatus::Todo, 0),
        ];
        let titles: Vec<&str> = filter_tasks(&tasks, &TaskFilter::default())
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["early", "first-dup", "second-dup", "late"]);
    }

    #[test]
    fn test_fields_combine_with_and() {
        let mut a = task("Fix login bug", TaskStatus::Todo, 0);
        a.priority = TaskPriority::High;
        a.tags = vec!["backend".to_string()];
        let mut b = task("Fix CSS", TaskStatus::Todo, 1);
        b.priority = TaskPriority::Low;
        b.tags = vec!["frontend".to_string()];
        let mut c = task("Write docs", TaskStatus::Todo, 2);
        c.priority = TaskPriority::High;
        c.description = "explain the LOGIN flow".to_string();
        let tasks = vec![a, b, c];

        let filter = TaskFilter {
            priorities: Some(vec![TaskPriority::High]),
            search: Some("login".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(filter_tasks(&tasks, &filter).len(), 2);

        let filter = TaskFilter {
            tags: Some(vec!["frontend".to_string(), "backend".to_string()]),
            priorities: Some(vec![TaskPriority::High]),
            ..TaskFilter::default()
        };
        let matched = filter_tasks(&tasks, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Fix login bug");
    }

    #[test]
    fn test_empty_sets_impose_nothing() {
        let tasks = vec![task("a", TaskStatus::Todo, 0)];
        let filter = TaskFilter {
            statuses: Some(Vec::new()),
            tags: Some(Vec::new()),
            search: Some("   ".to_string()),
            project_id: Some(String::new()),
            ..TaskFilter::default()
        };
        assert_eq!(filter_tasks(&tasks, &filter).len(), 1);
    }

    #[test]
    fn test_due_range_is_inclusive_and_excludes_undated() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        let mut early = task("early", TaskStatus::Todo, 0);
        early.due_date = Some(day(1));
        let mut mid = task("mid", TaskStatus::Todo, 1);
        mid.due_date = Some(day(10));
        let mut late = task("late", TaskStatus::Todo, 2);
        late.due_date = Some(day(20));
        let undated = task("undated", TaskStatus::Todo, 3);
        let tasks = vec![early, mid, late, undated];

        let filter = TaskFilter {
            due_from: Some(day(1)),
            due_to: Some(day(10)),
            ..TaskFilter::default()
        };
        let titles: Vec<&str> = filter_tasks(&tasks, &filter)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["early", "mid"]);
    }

    #[test]
    fn test_merge_overlays_present_fields_only() {
        let mut filter = TaskFilter {
            statuses: Some(vec![TaskStatus::Todo]),
            search: Some("old".to_string()),
            ..TaskFilter::default()
        };
        filter.merge(TaskFilter {
            search: Some("new".to_string()),
            ..TaskFilter::default()
        });
        assert_eq!(filter.statuses, Some(vec![TaskStatus::Todo]));
        assert_eq!(filter.search.as_deref(), Some("new"));
    }

    #[test]
    fn test_notes_pinned_first_then_recent() {
        let mut old_pinned = Note::new(NewNote::new("old pinned"));
        old_pinned.is_pinned = true;
        let mut newest = Note::new(NewNote::new("newest"));
        newest.updated_at = old_pinned.updated_at + Duration::minutes(10);
        let mut middle = Note::new(NewNote::new("middle"));
        middle.updated_at = old_pinned.updated_at + Duration::minutes(5);
        let notes = vec![middle, old_pinned, newest];

        let titles: Vec<&str> = filter_notes(&notes, &NoteFilter::default())
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["old pinned", "newest", "middle"]);
    }

    #[test]
    fn test_note_search_covers_tags() {
        let mut tagged = Note::new(NewNote::new("Groceries"));
        tagged.tags = vec!["Shopping".to_string()];
        let mut other = Note::new(NewNote::new("Standup"));
        other.content = "Discussed release".to_string();
        other.category = NoteCategory::Meeting;
        let notes = vec![tagged, other];

        let by_tag = NoteFilter {
            search: Some("shop".to_string()),
            ..NoteFilter::default()
        };
        assert_eq!(filter_notes(&notes, &by_tag)[0].title, "Groceries");

        let by_content = NoteFilter {
            search: Some("RELEASE".to_string()),
            categories: Some(vec![NoteCategory::Meeting]),
            ..NoteFilter::default()
        };
        assert_eq!(filter_notes(&notes, &by_content).len(), 1);

        let pinned_only = NoteFilter {
            pinned: Some(true),
            ..NoteFilter::default()
        };
        assert!(filter_notes(&notes, &pinned_only).is_empty());
    }

    #[test]
    fn test_sessions_newest_first() {
        let mut first = session(None, None, 10);
        let mut second = session(None, None, 20);
        second.start_time = first.start_time + Duration::hours(1);
        first.description = "first".to_string();
        second.description = "second".to_string();
        let sessions = vec![first, second];

        let ordered = filter_sessions(&sessions, &SessionFilter::default());
        assert_eq!(ordered[0].description, "second");
        assert_eq!(ordered[1].description, "first");
    }

    #[test]
    fn test_project_stats_round_percentage() {
        let project = Project::new(NewProject::new("Launch"));
        let mut tasks = vec![
            task("a", TaskStatus::Completed, 0),
            task("b", TaskStatus::Completed, 1),
            task("c", TaskStatus::Todo, 2),
            task("elsewhere", TaskStatus::InProgress, 3),
        ];
        for t in tasks.iter_mut().take(3) {
            t.project_id = Some(project.id.clone());
        }

        let stats = project_task_stats(&tasks, &project.id);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.percentage, 67);
    }

    #[test]
    fn test_stats_for_unknown_project_are_zero() {
        let tasks = vec![task("a", TaskStatus::Completed, 0)];
        assert_eq!(project_task_stats(&tasks, "missing"), TaskStats::default());
    }

    #[test]
    fn test_time_totals() {
        let sessions = vec![
            session(Some("t1"), Some("p1"), 60),
            session(Some("t1"), None, 30),
            session(None, Some("p1"), 15),
        ];
        assert_eq!(total_time_for_task(&sessions, "t1"), 90);
        assert_eq!(total_time_for_project(&sessions, "p1"), 75);
        assert_eq!(total_time_for_task(&sessions, "unseen"), 0);
        assert_eq!(total_time(&sessions), 105);
        assert_eq!(sessions_for_project(&sessions, "p1").len(), 2);
    }

    #[test]
    fn test_dangling_references_resolve_to_fallbacks() {
        let projects = vec![Project::new(NewProject::new("Home"))];
        let id = projects[0].id.clone();

        assert!(resolve(&projects, Some("gone")).is_none());
        assert!(resolve(&projects, None).is_none());
        assert_eq!(resolve(&projects, Some(id.as_str())).unwrap().name, "Home");
        assert_eq!(project_label(&projects, Some("gone")), "Unknown project");
        assert_eq!(project_label(&projects, None), "No project");
        assert_eq!(task_label(&[], Some("gone")), "Unknown task");
    }

    #[test]
    fn test_dashboard_counts() {
        let today = Local::now().date_naive();
        let mut done = task("done", TaskStatus::Completed, 0);
        done.completed_at = Some(Utc::now());
        let mut late = task("late", TaskStatus::Todo, 1);
        late.due_date = today.pred_opt();
        let mut late_but_done = task("late but done", TaskStatus::Completed, 2);
        late_but_done.due_date = today.pred_opt();
        let busy = task("busy", TaskStatus::InProgress, 3);
        let tasks = vec![done, late, late_but_done, busy];

        let mut archived = Project::new(NewProject::new("old"));
        archived.is_archived = true;
        let projects = vec![Project::new(NewProject::new("new")), archived];
        let notes = vec![Note::new(NewNote::new("n"))];
        let sessions = vec![session(None, None, 120)];

        let stats = dashboard_stats(&tasks, &notes, &projects, &sessions, today);
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.completed_tasks, 2);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completed_this_week, 1);
        assert_eq!(stats.completed_this_month, 1);
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.total_notes, 1);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.total_time_tracked, 120);
    }

    #[test]
    fn test_recent_tasks_limit() {
        let mut tasks: Vec<Task> = (0..7).map(|i| task("t", TaskStatus::Todo, i)).collect();
        for (i, t) in tasks.iter_mut().enumerate() {
            t.updated_at = t.updated_at + Duration::seconds(i as i64);
        }
        let recent = recent_tasks(&tasks, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].order, 6);
    }

    #[test]
    fn test_percentage_never_divides_by_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(3, 3), 100);
    }
}
