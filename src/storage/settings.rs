//! Persisted user configuration.
//!
//! Two small JSON objects, each overwritten on every change:
//! - `tff_settings.json`: Time Free Focus bounds
//! - `user_settings.json`: `{"last_timer_mode": <index>}`

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::file::{read_json, write_json, ReadOutcome};
use super::SettingsStore;
use crate::config::Paths;
use crate::error::FocusError;
use crate::features::focus::{PolicyConfig, TimerMode};

/// Per-user preferences that outlive a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Selector index of the last used mode (see `TimerMode::index`)
    pub last_timer_mode: u32,
}

impl UserSettings {
    /// Last used mode.
    #[must_use]
    pub const fn mode(&self) -> TimerMode {
        TimerMode::from_index(self.last_timer_mode)
    }

    /// Settings remembering `mode`.
    #[must_use]
    pub const fn with_mode(mode: TimerMode) -> Self {
        Self {
            last_timer_mode: mode.index(),
        }
    }
}

/// Settings backed by two JSON files.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    tff_path: PathBuf,
    user_path: PathBuf,
}

impl JsonSettingsStore {
    /// Create a store for the given file paths.
    #[must_use]
    pub fn new(tff_path: impl Into<PathBuf>, user_path: impl Into<PathBuf>) -> Self {
        Self {
            tff_path: tff_path.into(),
            user_path: user_path.into(),
        }
    }

    /// Store using the standard file names under `paths`.
    #[must_use]
    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(paths.tff_settings.clone(), paths.user_settings.clone())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load_policy(&self) -> PolicyConfig {
        match read_json(&self.tff_path) {
            ReadOutcome::Parsed(policy) => policy,
            ReadOutcome::Missing | ReadOutcome::Corrupt => PolicyConfig::default(),
        }
    }

    fn save_policy(&self, policy: &PolicyConfig) -> Result<(), FocusError> {
        write_json(&self.tff_path, policy, false)
    }

    fn load_user(&self) -> UserSettings {
        match read_json(&self.user_path) {
            ReadOutcome::Parsed(user) => user,
            ReadOutcome::Missing | ReadOutcome::Corrupt => UserSettings::default(),
        }
    }

    fn save_user(&self, user: &UserSettings) -> Result<(), FocusError> {
        write_json(&self.user_path, user, false)
    }
}

/// Settings held in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    policy: Mutex<Option<PolicyConfig>>,
    user: Mutex<Option<UserSettings>>,
}

impl MemorySettingsStore {
    /// Create an empty store (reads return defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `policy`.
    #[must_use]
    pub fn with_policy(policy: PolicyConfig) -> Self {
        Self {
            policy: Mutex::new(Some(policy)),
            user: Mutex::new(None),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load_policy(&self) -> PolicyConfig {
        self.policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_default()
    }

    fn save_policy(&self, policy: &PolicyConfig) -> Result<(), FocusError> {
        *self.policy.lock().unwrap_or_else(PoisonError::into_inner) = Some(*policy);
        Ok(())
    }

    fn load_user(&self) -> UserSettings {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or_default()
    }

    fn save_user(&self, user: &UserSettings) -> Result<(), FocusError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(*user);
        Ok(())
    }
}
