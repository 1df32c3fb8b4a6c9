use std::rc::Rc;

use super::Patch;
use crate::display::DisplaySurface;
use crate::models::{AppSettings, TaskView, Theme};
use crate::storage::{Storage, keys};

#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub accent_color: Option<String>,
    pub sound_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub compact_mode: Option<bool>,
    pub show_completed_tasks: Option<bool>,
    pub default_task_view: Option<TaskView>,
}

impl Patch<AppSettings> for SettingsUpdate {
    fn apply(self, settings: &mut AppSettings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(accent_color) = self.accent_color {
            settings.accent_color = accent_color;
        }
        if let Some(sound_enabled) = self.sound_enabled {
            settings.sound_enabled = sound_enabled;
        }
        if let Some(notifications_enabled) = self.notifications_enabled {
            settings.notifications_enabled = notifications_enabled;
        }
        if let Some(compact_mode) = self.compact_mode {
            settings.compact_mode = compact_mode;
        }
        if let Some(show_completed_tasks) = self.show_completed_tasks {
            settings.show_completed_tasks = show_completed_tasks;
        }
        if let Some(default_task_view) = self.default_task_view {
            settings.default_task_view = default_task_view;
        }
    }
}

/// Holds the settings record and keeps the display in step with its theme
pub struct SettingsStore {
    settings: AppSettings,
    storage: Rc<Storage>,
    display: Box<dyn DisplaySurface>,
}

impl SettingsStore {
    pub fn load(storage: Rc<Storage>, display: Box<dyn DisplaySurface>) -> Self {
        let settings = storage.load(keys::SETTINGS, AppSettings::default());
        let mut store = Self {
            settings,
            storage,
            display,
        };
        store.apply_theme();
        store
    }

    pub fn reload(&mut self) {
        self.settings = self.storage.load(keys::SETTINGS, AppSettings::default());
        self.apply_theme();
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn update(&mut self, update: SettingsUpdate) {
        update.apply(&mut self.settings);
        if let Err(e) = self.storage.save(keys::SETTINGS, &self.settings) {
            tracing::error!(error = %e, "failed to persist settings");
        }
        self.apply_theme();
    }

    /// Dark goes to light; light and auto go to dark
    pub fn toggle_theme(&mut self) -> Theme {
        let next = match self.settings.theme {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::Auto => Theme::Dark,
        };
        self.update(SettingsUpdate {
            theme: Some(next),
            ..SettingsUpdate::default()
        });
        next
    }

    /// Whether the current theme renders dark on this display
    pub fn is_dark(&self) -> bool {
        self.settings.theme.is_dark(self.display.prefers_dark())
    }

    fn apply_theme(&mut self) {
        let dark = self.is_dark();
        self.display.set_dark_mode(dark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every mode pushed to it
    struct RecordingDisplay {
        prefers_dark: bool,
        calls: Rc<RefCell<Vec<bool>>>,
    }

    impl DisplaySurface for RecordingDisplay {
        fn set_dark_mode(&mut self, enabled: bool) {
            self.calls.borrow_mut().push(enabled);
        }

        fn prefers_dark(&self) -> bool {
            self.prefers_dark
        }
    }

    fn setup(prefers_dark: bool) -> (SettingsStore, Rc<Storage>, Rc<RefCell<Vec<bool>>>) {
        let storage = Rc::new(Storage::in_memory());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let display = RecordingDisplay {
            prefers_dark,
            calls: Rc::clone(&calls),
        };
        let store = SettingsStore::load(Rc::clone(&storage), Box::new(display));
        (store, storage, calls)
    }

    #[test]
    fn test_defaults_applied_on_load() {
        let (store, _, calls) = setup(false);
        let settings = store.settings();

        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.accent_color, "#3b82f6");
        assert!(settings.sound_enabled);
        assert!(settings.notifications_enabled);
        assert!(!settings.compact_mode);
        assert!(settings.show_completed_tasks);
        assert_eq!(settings.default_task_view, TaskView::List);
        assert_eq!(*calls.borrow(), vec![false]);
    }

    #[test]
    fn test_update_merges_and_persists() {
        let (mut store, storage, calls) = setup(false);
        store.update(SettingsUpdate {
            compact_mode: Some(true),
            theme: Some(Theme::Dark),
            ..SettingsUpdate::default()
        });

        assert!(store.settings().compact_mode);
        assert!(store.settings().sound_enabled);
        assert_eq!(calls.borrow().last(), Some(&true));

        let saved: AppSettings = storage.load(keys::SETTINGS, AppSettings::default());
        assert_eq!(saved.theme, Theme::Dark);
        assert!(saved.compact_mode);
    }

    #[test]
    fn test_toggle_theme() {
        let (mut store, _, _) = setup(false);
        assert_eq!(store.toggle_theme(), Theme::Dark);
        assert_eq!(store.toggle_theme(), Theme::Light);

        store.update(SettingsUpdate {
            theme: Some(Theme::Auto),
            ..SettingsUpdate::default()
        });
        assert_eq!(store.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn test_auto_follows_display_preference() {
        let (mut store, _, calls) = setup(true);
        store.update(SettingsUpdate {
            theme: Some(Theme::Auto),
            ..SettingsUpdate::default()
        });

        assert!(store.is_dark());
        assert_eq!(*calls.borrow(), vec![false, true]);
    }

    #[test]
    fn test_reload_reapplies_stored_theme() {
        let (mut store, storage, calls) = setup(false);
        let dark = AppSettings {
            theme: Theme::Dark,
            ..AppSettings::default()
        };
        storage.save(keys::SETTINGS, &dark).unwrap();

        store.reload();
        assert_eq!(store.settings().theme, Theme::Dark);
        assert_eq!(calls.borrow().last(), Some(&true));
    }
}
