pub mod notes;
pub mod projects;
pub mod settings;
pub mod tasks;
pub mod timer;

pub use notes::{NoteStore, NoteUpdate};
pub use projects::{ProjectStore, ProjectUpdate};
pub use settings::{SettingsStore, SettingsUpdate};
pub use tasks::{TaskStore, TaskUpdate};
pub use timer::{SessionUpdate, TickOutcome, Ticker, TimerState, TimerStore};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;

use crate::storage::Storage;

/// An entity kept in its own storage slot
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Storage slot holding the whole collection
    const KEY: &'static str;

    fn id(&self) -> &str;

    /// Stamp a modification. Records without an `updated_at` ignore it.
    fn touch(&mut self) {}
}

/// A set of optional field changes for `T`
pub trait Patch<T> {
    fn apply(self, target: &mut T);
}

/// One homogeneous collection mirrored to storage after every mutation.
///
/// Persistence failures are logged and otherwise ignored: the in-memory
/// collection stays authoritative for the session.
pub struct Collection<T: Record> {
    items: Vec<T>,
    selected_id: Option<String>,
    storage: Rc<Storage>,
}

impl<T: Record> Collection<T> {
    pub fn load(storage: Rc<Storage>) -> Self {
        let items = storage.load(T::KEY, Vec::new());
        Self {
            items,
            selected_id: None,
            storage,
        }
    }

    /// Re-read the slot, dropping in-memory state
    pub fn reload(&mut self) {
        self.items = self.storage.load(T::KEY, Vec::new());
        self.selected_id = None;
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append and persist, returning the new record's id
    pub fn insert(&mut self, item: T) -> String {
        let id = item.id().to_string();
        self.items.push(item);
        self.persist();
        tracing::debug!(key = T::KEY, %id, "record added");
        id
    }

    /// Apply `change` to the record with `id`, stamp it and persist.
    /// Returns `false` without touching storage when the id is unknown.
    pub fn modify(&mut self, id: &str, change: impl FnOnce(&mut T)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        change(item);
        item.touch();
        self.persist();
        tracing::debug!(key = T::KEY, %id, "record updated");
        true
    }

    pub fn update(&mut self, id: &str, patch: impl Patch<T>) -> bool {
        self.modify(id, |item| patch.apply(item))
    }

    /// Hard-remove the record, clearing the selection if it pointed at it
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;

        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        if removed {
            self.persist();
            tracing::debug!(key = T::KEY, %id, "record removed");
        }
        removed
    }

    /// Swap in a whole new sequence and persist it
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.persist();
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_string);
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The selected record, or `None` if nothing is selected or it is gone
    pub fn selected(&self) -> Option<&T> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub(crate) fn storage(&self) -> &Rc<Storage> {
        &self.storage
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(T::KEY, &self.items) {
            tracing::error!(key = T::KEY, error = %e, "failed to persist collection");
        }
    }
}
