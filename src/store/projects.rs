use std::rc::Rc;

use super::{Collection, Patch, Record};
use crate::models::{NewProject, Project};
use crate::storage::{Storage, keys};
use crate::utils;

impl Record for Project {
    const KEY: &'static str = keys::PROJECTS;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = utils::stamp_after(self.updated_at);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_archived: Option<bool>,
}

impl Patch<Project> for ProjectUpdate {
    fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(color) = self.color {
            project.color = color;
        }
        if let Some(icon) = self.icon {
            project.icon = icon;
        }
        if let Some(is_archived) = self.is_archived {
            project.is_archived = is_archived;
        }
    }
}

pub struct ProjectStore {
    records: Collection<Project>,
}

impl ProjectStore {
    pub fn load(storage: Rc<Storage>) -> Self {
        Self {
            records: Collection::load(storage),
        }
    }

    pub fn reload(&mut self) {
        self.records.reload();
    }

    pub fn add(&mut self, fields: NewProject) -> String {
        self.records.insert(Project::new(fields))
    }

    pub fn update(&mut self, id: &str, update: ProjectUpdate) -> bool {
        self.records.update(id, update)
    }

    /// Removes only the project; tasks, notes and sessions keep their ids
    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id)
    }

    pub fn archive(&mut self, id: &str) -> bool {
        self.records.modify(id, |project| project.is_archived = true)
    }

    pub fn unarchive(&mut self, id: &str) -> bool {
        self.records.modify(id, |project| project.is_archived = false)
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.records.get(id)
    }

    pub fn all(&self) -> &[Project] {
        self.records.all()
    }

    pub fn active(&self) -> Vec<&Project> {
        self.all().iter().filter(|p| !p.is_archived).collect()
    }

    pub fn archived(&self) -> Vec<&Project> {
        self.all().iter().filter(|p| p.is_archived).collect()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.records.select(id);
    }

    pub fn selected(&self) -> Option<&Project> {
        self.records.selected()
    }
}
