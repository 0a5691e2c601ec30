//! Application configuration for tffocus.
//!
//! Settings are loaded from `~/.tffocus/config.yaml`. Every section is
//! optional; missing keys take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FocusError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Timer engine settings.
    pub timer: TimerConfig,
    /// Phase change notifications.
    pub notifications: NotificationConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Color output setting.
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply this setting to the `colored` crate's global override.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Timer engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerConfig {
    /// Drive loop poll interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Default Pomodoro work length in minutes.
    #[serde(default = "default_pomodoro_work")]
    pub pomodoro_work_minutes: u32,
    /// Default Pomodoro rest length in minutes.
    #[serde(default = "default_pomodoro_rest")]
    pub pomodoro_rest_minutes: u32,
}

/// Phase change notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    /// Ring the terminal bell when work or rest ends.
    #[serde(default = "default_true")]
    pub bell: bool,
}

const fn default_poll_interval() -> u64 {
    200
}

const fn default_pomodoro_work() -> u32 {
    25
}

const fn default_pomodoro_rest() -> u32 {
    5
}

const fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            pomodoro_work_minutes: default_pomodoro_work(),
            pomodoro_rest_minutes: default_pomodoro_rest(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            bell: default_true(),
        }
    }
}

impl TimerConfig {
    /// Poll interval as a `Duration`, clamped to at least 10ms.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, FocusError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FocusError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| {
            FocusError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}
