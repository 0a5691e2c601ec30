//! Error types for tffocus.

use thiserror::Error;

/// Errors produced by tffocus.
#[derive(Debug, Error)]
pub enum FocusError {
    /// Configuration could not be resolved, read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before reaching the timer engine.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A session log or settings file could not be persisted.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Terminal setup or rendering failed.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Serialized data could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FocusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for FocusError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl FocusError {
    /// Whether this error came from user input rather than the environment.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
