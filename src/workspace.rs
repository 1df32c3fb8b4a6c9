use chrono::Local;
use std::rc::Rc;

use crate::display::DisplaySurface;
use crate::query::{self, DashboardStats};
use crate::storage::{Storage, StorageError};
use crate::store::{NoteStore, ProjectStore, SettingsStore, TaskStore, TimerStore};
use crate::transfer;

/// Every store over one shared storage gateway
pub struct Workspace {
    storage: Rc<Storage>,
    pub tasks: TaskStore,
    pub notes: NoteStore,
    pub projects: ProjectStore,
    pub timer: TimerStore,
    pub settings: SettingsStore,
}

impl Workspace {
    pub fn open(storage: Storage, display: Box<dyn DisplaySurface>) -> Self {
        let storage = Rc::new(storage);
        Self {
            tasks: TaskStore::load(Rc::clone(&storage)),
            notes: NoteStore::load(Rc::clone(&storage)),
            projects: ProjectStore::load(Rc::clone(&storage)),
            timer: TimerStore::load(Rc::clone(&storage)),
            settings: SettingsStore::load(Rc::clone(&storage), display),
            storage,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Re-read every store from storage
    pub fn reload(&mut self) {
        self.tasks.reload();
        self.notes.reload();
        self.projects.reload();
        self.timer.reload();
        self.settings.reload();
    }

    pub fn export(&self) -> Result<String, StorageError> {
        transfer::export(&self.storage)
    }

    /// Apply a bundle and reload the stores from the imported slots.
    /// A rejected bundle leaves the stores untouched.
    pub fn import(&mut self, text: &str) -> bool {
        let outcome = transfer::apply(&self.storage, text);
        if outcome.changed_storage() {
            self.reload();
        }
        outcome.succeeded()
    }

    /// Wipe every slot, then reload so the stores start empty
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        let result = self.storage.clear_all();
        self.reload();
        result
    }

    pub fn dashboard(&self) -> DashboardStats {
        query::dashboard_stats(
            self.tasks.all(),
            self.notes.all(),
            self.projects.all(),
            self.timer.all(),
            Local::now().date_naive(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TerminalDisplay;
    use crate::models::{NewNote, NewProject, NewSession, NewTask, Theme};
    use crate::storage::{MemoryStore, keys};
    use crate::store::SettingsUpdate;

    fn workspace() -> Workspace {
        Workspace::open(Storage::in_memory(), Box::new(TerminalDisplay::new(Some(false))))
    }

    fn populate(ws: &mut Workspace) {
        let project = ws.projects.add(NewProject::new("Launch"));
        let mut task = NewTask::new("Ship it");
        task.project_id = Some(project);
        let task_id = ws.tasks.add(task);
        ws.tasks.toggle_status(&task_id);
        ws.notes.add(NewNote::new("Retro"));

        let mut session = NewSession::new("deploy");
        session.task_id = Some(task_id);
        ws.timer.start(session);
        ws.timer.tick(90);
        ws.timer.stop();

        ws.settings.update(SettingsUpdate {
            theme: Some(Theme::Dark),
            ..SettingsUpdate::default()
        });
    }

    #[test]
    fn test_export_clear_import_round_trip() {
        let mut ws = workspace();
        populate(&mut ws);

        let tasks = ws.tasks.all().to_vec();
        let notes = ws.notes.all().to_vec();
        let projects = ws.projects.all().to_vec();
        let sessions = ws.timer.all().to_vec();
        let settings = ws.settings.settings().clone();

        let text = ws.export().unwrap();
        ws.clear_all().unwrap();
        assert!(ws.tasks.all().is_empty());
        assert_eq!(ws.settings.settings().theme, Theme::Light);

        assert!(ws.import(&text));
        assert_eq!(ws.tasks.all(), tasks.as_slice());
        assert_eq!(ws.notes.all(), notes.as_slice());
        assert_eq!(ws.projects.all(), projects.as_slice());
        assert_eq!(ws.timer.all(), sessions.as_slice());
        assert_eq!(ws.settings.settings(), &settings);
    }

    #[test]
    fn test_failed_import_leaves_stores_alone() {
        let mut ws = workspace();
        populate(&mut ws);

        assert!(!ws.import("{ broken"));
        assert_eq!(ws.tasks.all().len(), 1);
        assert_eq!(ws.timer.all().len(), 1);
    }

    #[test]
    fn test_rejected_import_keeps_unsaved_records_and_selection() {
        let storage = Storage::new(MemoryStore::with_quota(16));
        let mut ws = Workspace::open(storage, Box::new(TerminalDisplay::new(Some(false))));

        // Too large for the quota, so only the in-memory copy exists
        let id = ws.tasks.add(NewTask::new("Unsaved task"));
        ws.tasks.select(Some(&id));
        assert!(ws.storage().load_raw(keys::TASKS).unwrap().is_none());

        assert!(!ws.import("{ not a bundle"));
        assert_eq!(ws.tasks.all().len(), 1);
        assert_eq!(ws.tasks.selected().map(|t| t.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn test_rejected_import_keeps_running_session_elapsed() {
        let mut ws = workspace();
        ws.timer.start(NewSession::new("focus"));
        ws.timer.tick(300);

        assert!(!ws.import("not json"));
        assert!(ws.timer.active().is_some());
        assert_eq!(ws.timer.elapsed(), 300);
    }

    #[test]
    fn test_partial_import_reloads_written_slots() {
        let storage = Storage::new(MemoryStore::with_quota(8));
        let mut ws = Workspace::open(storage, Box::new(TerminalDisplay::new(Some(false))));
        ws.tasks.add(NewTask::new("Unsaved task"));

        let bundle = r#"{"tasks": "[]", "projects": "[1, 2, 3, 4, 5]"}"#;
        assert!(!ws.import(bundle));
        assert!(ws.tasks.all().is_empty());
    }

    #[test]
    fn test_dashboard_counts() {
        let mut ws = workspace();
        populate(&mut ws);
        ws.tasks.add(NewTask::new("Follow up"));

        let stats = ws.dashboard();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.total_notes, 1);
        assert_eq!(stats.active_projects, 1);
        assert_eq!(stats.total_time_tracked, 90);
    }
}
