use chrono::{DateTime, NaiveDate, Utc};
use std::rc::Rc;

use super::{Collection, Patch, Record};
use crate::models::{NewTask, Task, TaskPriority, TaskStatus};
use crate::query::{self, TaskFilter};
use crate::storage::{Storage, keys};
use crate::utils;

impl Record for Task {
    const KEY: &'static str = keys::TASKS;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = utils::stamp_after(self.updated_at);
    }
}

/// Field changes for a task. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    pub project_id: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub estimated_time: Option<Option<u32>>,
    pub time_spent: Option<Option<u32>>,
    pub order: Option<i64>,
}

impl Patch<Task> for TaskUpdate {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(estimated_time) = self.estimated_time {
            task.estimated_time = estimated_time;
        }
        if let Some(time_spent) = self.time_spent {
            task.time_spent = time_spent;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}

pub struct TaskStore {
    records: Collection<Task>,
    filters: TaskFilter,
}

impl TaskStore {
    pub fn load(storage: Rc<Storage>) -> Self {
        Self {
            records: Collection::load(storage),
            filters: TaskFilter::default(),
        }
    }

    pub fn reload(&mut self) {
        self.records.reload();
    }

    /// Create a task at the end of the manual order
    pub fn add(&mut self, fields: NewTask) -> String {
        let order = self.records.len() as i64;
        self.records.insert(Task::new(fields, order))
    }

    pub fn update(&mut self, id: &str, update: TaskUpdate) -> bool {
        self.records.update(id, update)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id)
    }

    /// Flip todo and completed, stamping or clearing `completed_at`.
    /// In-progress and archived tasks are left alone.
    pub fn toggle_status(&mut self, id: &str) -> bool {
        let next = match self.records.get(id).map(|t| t.status) {
            Some(TaskStatus::Todo) => TaskStatus::Completed,
            Some(TaskStatus::Completed) => TaskStatus::Todo,
            Some(TaskStatus::InProgress) | Some(TaskStatus::Archived) | None => return false,
        };

        self.records.modify(id, |task| {
            task.status = next;
            task.completed_at = (next == TaskStatus::Completed).then(Utc::now);
        })
    }

    /// Replace the collection with `sequence`, renumbering `order` to each
    /// task's position
    pub fn reorder(&mut self, sequence: Vec<Task>) {
        let renumbered = sequence
            .into_iter()
            .enumerate()
            .map(|(index, mut task)| {
                task.order = index as i64;
                task
            })
            .collect();
        self.records.replace_all(renumbered);
    }

    /// Move one task to `position` in the manual order (clamped to the end)
    pub fn move_to(&mut self, id: &str, position: usize) -> bool {
        let mut sequence: Vec<Task> = query::filter_tasks(self.records.all(), &TaskFilter::default())
            .into_iter()
            .cloned()
            .collect();
        let Some(from) = sequence.iter().position(|t| t.id == id) else {
            return false;
        };

        let task = sequence.remove(from);
        let to = position.min(sequence.len());
        sequence.insert(to, task);
        self.reorder(sequence);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.records.get(id)
    }

    pub fn all(&self) -> &[Task] {
        self.records.all()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.records.select(id);
    }

    pub fn selected(&self) -> Option<&Task> {
        self.records.selected()
    }

    pub fn filters(&self) -> &TaskFilter {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: TaskFilter) {
        self.filters.merge(filters);
    }

    pub fn clear_filters(&mut self) {
        self.filters = TaskFilter::default();
    }

    /// Tasks passing the current filters, in manual order
    pub fn filtered(&self) -> Vec<&Task> {
        query::filter_tasks(self.records.all(), &self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProject;
    use crate::store::ProjectStore;

    fn store() -> (TaskStore, Rc<Storage>) {
        let storage = Rc::new(Storage::in_memory());
        (TaskStore::load(Rc::clone(&storage)), storage)
    }

    #[test]
    fn test_add_then_get_returns_input_fields() {
        let (mut tasks, _storage) = store();
        let due = NaiveDate::from_ymd_opt(2030, 1, 15).unwrap();
        let id = tasks.add(NewTask {
            title: "Write report".to_string(),
            description: "first draft".to_string(),
            priority: TaskPriority::High,
            tags: vec!["docs".to_string()],
            project_id: Some("p1".to_string()),
            due_date: Some(due),
            estimated_time: Some(30),
            ..NewTask::default()
        });

        let task = tasks.get(&id).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "first draft");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.tags, vec!["docs"]);
        assert_eq!(task.project_id.as_deref(), Some("p1"));
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.estimated_time, Some(30));
        assert_eq!(task.order, 0);
        assert!(task.completed_at.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_add_appends_length_as_order() {
        let (mut tasks, _storage) = store();
        tasks.add(NewTask::new("a"));
        let b = tasks.add(NewTask::new("b"));
        assert_eq!(tasks.get(&b).unwrap().order, 1);
    }

    #[test]
    fn test_toggle_status_round_trip() {
        let (mut tasks, _storage) = store();
        let id = tasks.add(NewTask::new("Write report"));

        assert!(tasks.toggle_status(&id));
        let task = tasks.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());

        assert!(tasks.toggle_status(&id));
        let task = tasks.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_toggle_status_ignores_in_progress() {
        let (mut tasks, _storage) = store();
        let mut fields = NewTask::new("busy");
        fields.status = TaskStatus::InProgress;
        let id = tasks.add(fields);
        let before = tasks.get(&id).unwrap().clone();

        assert!(!tasks.toggle_status(&id));
        assert!(!tasks.toggle_status(&id));
        assert_eq!(tasks.get(&id).unwrap(), &before);
        assert!(!tasks.toggle_status("missing"));
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let (mut tasks, _storage) = store();
        let id = tasks.add(NewTask::new("original"));
        let before = tasks.get(&id).unwrap().clone();

        assert!(tasks.update(
            &id,
            TaskUpdate {
                priority: Some(TaskPriority::Urgent),
                ..TaskUpdate::default()
            }
        ));

        let after = tasks.get(&id).unwrap();
        assert_eq!(after.priority, TaskPriority::Urgent);
        assert_eq!(after.title, before.title);
        assert_eq!(after.status, before.status);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn test_update_can_clear_optional_fields() {
        let (mut tasks, _storage) = store();
        let mut fields = NewTask::new("linked");
        fields.project_id = Some("p1".to_string());
        let id = tasks.add(fields);

        tasks.update(
            &id,
            TaskUpdate {
                project_id: Some(None),
                ..TaskUpdate::default()
            },
        );
        assert!(tasks.get(&id).unwrap().project_id.is_none());
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let (mut tasks, _storage) = store();
        tasks.add(NewTask::new("only"));
        assert!(!tasks.update("missing", TaskUpdate::default()));
        assert_eq!(tasks.all().len(), 1);
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let (mut tasks, storage) = store();
        let id = tasks.add(NewTask::new("gone soon"));
        tasks.select(Some(&id));

        assert!(tasks.remove(&id));
        assert!(tasks.get(&id).is_none());
        assert!(tasks.selected().is_none());

        let reloaded = TaskStore::load(storage);
        assert!(reloaded.get(&id).is_none());
    }

    #[test]
    fn test_reorder_renumbers_densely() {
        let (mut tasks, storage) = store();
        let a = tasks.add(NewTask::new("a"));
        let b = tasks.add(NewTask::new("b"));
        let c = tasks.add(NewTask::new("c"));

        let sequence = vec![
            tasks.get(&c).unwrap().clone(),
            tasks.get(&a).unwrap().clone(),
            tasks.get(&b).unwrap().clone(),
        ];
        tasks.reorder(sequence);

        let titles: Vec<&str> = tasks.filtered().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);

        let reloaded = TaskStore::load(storage);
        let orders: Vec<i64> = reloaded.all().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_move_to_clamps_position() {
        let (mut tasks, _storage) = store();
        let a = tasks.add(NewTask::new("a"));
        tasks.add(NewTask::new("b"));
        tasks.add(NewTask::new("c"));

        assert!(tasks.move_to(&a, 99));
        let titles: Vec<&str> = tasks.filtered().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
        assert!(!tasks.move_to("missing", 0));
    }

    #[test]
    fn test_filters_merge_and_clear() {
        let (mut tasks, _storage) = store();
        let a = tasks.add(NewTask::new("alpha"));
        tasks.add(NewTask::new("beta"));
        tasks.toggle_status(&a);

        tasks.set_filters(TaskFilter {
            statuses: Some(vec![TaskStatus::Completed]),
            ..TaskFilter::default()
        });
        tasks.set_filters(TaskFilter {
            search: Some("ALPHA".to_string()),
            ..TaskFilter::default()
        });
        assert_eq!(tasks.filtered().len(), 1);
        assert!(tasks.filters().statuses.is_some());

        tasks.clear_filters();
        assert_eq!(tasks.filtered().len(), 2);
    }

    #[test]
    fn test_removing_project_does_not_touch_task_reference() {
        let (mut tasks, storage) = store();
        let mut projects = ProjectStore::load(Rc::clone(&storage));
        let project_id = projects.add(NewProject::new("Launch"));

        let mut fields = NewTask::new("orphan to be");
        fields.project_id = Some(project_id.clone());
        let id = tasks.add(fields);

        assert!(projects.remove(&project_id));
        assert!(projects.get(&project_id).is_none());
        assert_eq!(tasks.get(&id).unwrap().project_id.as_deref(), Some(project_id.as_str()));
        assert_eq!(
            query::project_label(projects.all(), tasks.get(&id).unwrap().project_id.as_deref()),
            "Unknown project"
        );
    }
}
