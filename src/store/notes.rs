use std::rc::Rc;

use super::{Collection, Patch, Record};
use crate::models::{NewNote, Note, NoteCategory};
use crate::query::{self, NoteFilter};
use crate::storage::{Storage, keys};
use crate::utils;

impl Record for Note {
    const KEY: &'static str = keys::NOTES;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = utils::stamp_after(self.updated_at);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NoteCategory>,
    pub tags: Option<Vec<String>>,
    pub project_id: Option<Option<String>>,
    pub is_pinned: Option<bool>,
}

impl Patch<Note> for NoteUpdate {
    fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(category) = self.category {
            note.category = category;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(project_id) = self.project_id {
            note.project_id = project_id;
        }
        if let Some(is_pinned) = self.is_pinned {
            note.is_pinned = is_pinned;
        }
    }
}

pub struct NoteStore {
    records: Collection<Note>,
    filters: NoteFilter,
}

impl NoteStore {
    pub fn load(storage: Rc<Storage>) -> Self {
        Self {
            records: Collection::load(storage),
            filters: NoteFilter::default(),
        }
    }

    pub fn reload(&mut self) {
        self.records.reload();
    }

    pub fn add(&mut self, fields: NewNote) -> String {
        self.records.insert(Note::new(fields))
    }

    pub fn update(&mut self, id: &str, update: NoteUpdate) -> bool {
        self.records.update(id, update)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id)
    }

    pub fn toggle_pin(&mut self, id: &str) -> bool {
        self.records.modify(id, |note| note.is_pinned = !note.is_pinned)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.records.get(id)
    }

    pub fn all(&self) -> &[Note] {
        self.records.all()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.records.select(id);
    }

    pub fn selected(&self) -> Option<&Note> {
        self.records.selected()
    }

    pub fn filters(&self) -> &NoteFilter {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: NoteFilter) {
        self.filters.merge(filters);
    }

    pub fn clear_filters(&mut self) {
        self.filters = NoteFilter::default();
    }

    /// Notes passing the current filters, pinned first then most recent
    pub fn filtered(&self) -> Vec<&Note> {
        query::filter_notes(self.records.all(), &self.filters)
    }
}
