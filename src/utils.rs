use chrono::{DateTime, NaiveDate, Utc};
use directories::{BaseDirs, ProjectDirs};
use rand::seq::IndexedRandom;
use std::path::PathBuf;

use crate::models::PROJECT_PALETTE;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "deskboard-dev",
            Profile::Prod => "deskboard",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "deskboard-dev" instead of "deskboard"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "deskboard", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path
/// If profile is Dev, uses "deskboard-dev" instead of "deskboard"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "deskboard", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Split a comma-separated tag list, dropping blanks
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn random_color() -> &'static str {
    PROJECT_PALETTE
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(PROJECT_PALETTE[0])
}

/// Current time, never earlier than `previous`
pub fn stamp_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}

/// Render seconds as `1h 5m`, `3m 7s` or `42s`
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// First eight characters of an id, enough to tell records apart in a listing
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
