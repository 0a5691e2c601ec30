//! Storage layer for tffocus.
//!
//! This module provides flat JSON persistence for:
//! - Session history (append-only log, whole-file rewrite per append)
//! - Time Free Focus bounds and the last selected mode (overwrite)
//!
//! Missing or corrupt files read as empty/default state.

mod file;
mod log;
mod settings;

pub use log::{JsonSessionLog, MemorySessionLog};
pub use settings::{JsonSettingsStore, MemorySettingsStore, UserSettings};

use crate::error::FocusError;
use crate::features::focus::{PolicyConfig, SessionRecord};

/// Append-only record of sealed sessions.
#[cfg_attr(test, mockall::automock)]
pub trait SessionLog: Send + Sync {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Storage` if the record could not be written.
    fn append(&self, record: &SessionRecord) -> Result<(), FocusError>;

    /// Every record in append order. Missing or corrupt logs read as empty.
    fn load(&self) -> Vec<SessionRecord>;
}

/// Current-value store for user configuration.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Time Free Focus bounds, or defaults when missing or corrupt.
    fn load_policy(&self) -> PolicyConfig;

    /// Overwrite the Time Free Focus bounds.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Storage` if the settings could not be written.
    fn save_policy(&self, policy: &PolicyConfig) -> Result<(), FocusError>;

    /// User settings, or defaults when missing or corrupt.
    fn load_user(&self) -> UserSettings;

    /// Overwrite the user settings.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Storage` if the settings could not be written.
    fn save_user(&self, user: &UserSettings) -> Result<(), FocusError>;
}
