pub mod cli;
pub mod config;
pub mod display;
pub mod logging;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod utils;
pub mod workspace;

pub use config::Config;
pub use display::{DisplaySurface, TerminalDisplay};
pub use models::{AppSettings, Note, Project, Task, TimeSession};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, Storage, StorageError};
pub use utils::Profile;
pub use workspace::Workspace;
