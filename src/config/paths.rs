//! Path resolution for tffocus configuration and data files.
//!
//! All tffocus data is stored in `~/.tffocus/` (or `$TFFOCUS_HOME`):
//! - `config.yaml` - Application configuration
//! - `sessions.json` - Session history log
//! - `tff_settings.json` - Time Free Focus interval bounds
//! - `user_settings.json` - Last selected timer mode
//! - `tffocus.log` - Diagnostics written while the TUI owns the terminal

use std::path::PathBuf;

use crate::error::FocusError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "TFFOCUS_HOME";

/// Paths to tffocus configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.tffocus/`
    pub root: PathBuf,
    /// Config file: `~/.tffocus/config.yaml`
    pub config_file: PathBuf,
    /// Session log: `~/.tffocus/sessions.json`
    pub session_log: PathBuf,
    /// Interval bounds: `~/.tffocus/tff_settings.json`
    pub tff_settings: PathBuf,
    /// User settings: `~/.tffocus/user_settings.json`
    pub user_settings: PathBuf,
    /// Diagnostics log: `~/.tffocus/tffocus.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths from `$TFFOCUS_HOME`, falling back to the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, FocusError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            FocusError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".tffocus")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            session_log: root.join("sessions.json"),
            tff_settings: root.join("tff_settings.json"),
            user_settings: root.join("user_settings.json"),
            log_file: root.join("tffocus.log"),
            root,
        }
    }

    /// Ensure the data directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), FocusError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                FocusError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".tffocus")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-tffocus");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.session_log, root.join("sessions.json"));
        assert_eq!(paths.tff_settings, root.join("tff_settings.json"));
        assert_eq!(paths.user_settings, root.join("user_settings.json"));
        assert_eq!(paths.log_file, root.join("tffocus.log"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested").join("data"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
    }
}
