use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError, keys};

/// Backup document: each field is the raw text of one storage slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default)]
    pub tasks: Option<String>,
    #[serde(default)]
    pub projects: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub time_sessions: Option<String>,
    #[serde(default)]
    pub settings: Option<String>,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
}

impl ExportBundle {
    fn slots(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (keys::TASKS, self.tasks.as_deref()),
            (keys::PROJECTS, self.projects.as_deref()),
            (keys::NOTES, self.notes.as_deref()),
            (keys::TIME_SESSIONS, self.time_sessions.as_deref()),
            (keys::SETTINGS, self.settings.as_deref()),
        ]
    }
}

/// Snapshot every data slot as pretty-printed JSON
pub fn export(storage: &Storage) -> Result<String, StorageError> {
    let bundle = ExportBundle {
        tasks: storage.load_raw(keys::TASKS)?,
        projects: storage.load_raw(keys::PROJECTS)?,
        notes: storage.load_raw(keys::NOTES)?,
        time_sessions: storage.load_raw(keys::TIME_SESSIONS)?,
        settings: storage.load_raw(keys::SETTINGS)?,
        exported_at: Some(Utc::now()),
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Result of applying a bundle to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Not a bundle; storage was not touched
    Rejected,
    /// A write failed after `written` slots had been stored
    Partial { written: usize },
    Imported { written: usize },
}

impl ImportOutcome {
    pub fn succeeded(self) -> bool {
        matches!(self, Self::Imported { .. })
    }

    /// Whether storage may now differ from what the stores hold in memory
    pub fn changed_storage(self) -> bool {
        match self {
            Self::Rejected => false,
            Self::Partial { written } => written > 0,
            Self::Imported { .. } => true,
        }
    }
}

/// Overwrite each present, non-empty slot verbatim.
///
/// Returns false without touching storage when `text` is not a bundle.
/// A write failure stops the import part way and also returns false.
pub fn import(storage: &Storage, text: &str) -> bool {
    apply(storage, text).succeeded()
}

/// Same as [`import`], reporting how far the import got
pub fn apply(storage: &Storage, text: &str) -> ImportOutcome {
    let bundle: ExportBundle = match serde_json::from_str(text) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!(error = %e, "import rejected: not a valid bundle");
            return ImportOutcome::Rejected;
        }
    };

    let mut written = 0;
    for (key, value) in bundle.slots() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Err(e) = storage.save_raw(key, value) {
            tracing::error!(key, written, error = %e, "import failed while writing slot");
            return ImportOutcome::Partial { written };
        }
        written += 1;
        tracing::debug!(key, bytes = value.len(), "imported slot");
    }
    ImportOutcome::Imported { written }
}
