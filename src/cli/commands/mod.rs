//! Command implementations for tffocus.
//!
//! This module contains the implementation of all CLI commands.

mod config;
mod history;
mod session;
mod shell;

pub use config::config;
pub use history::{history, last, summary};
pub use session::{pomodoro, start, tff};
pub use shell::completions;

use std::sync::Arc;

use crate::config::Paths;
use crate::features::focus::FocusSessionManager;
use crate::storage::{JsonSessionLog, JsonSettingsStore};

/// File-backed stores under `paths`.
fn stores(paths: &Paths) -> (Arc<JsonSessionLog>, Arc<JsonSettingsStore>) {
    (
        Arc::new(JsonSessionLog::new(paths.session_log.clone())),
        Arc::new(JsonSettingsStore::from_paths(paths)),
    )
}

/// Manager for commands that only read or change settings.
fn settings_manager(paths: &Paths) -> FocusSessionManager {
    let (log, settings) = stores(paths);
    FocusSessionManager::builder(log, settings).runtime(None).build()
}
