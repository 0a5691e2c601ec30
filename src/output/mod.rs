//! Output formatting for tffocus.
//!
//! This module provides formatters for displaying session history and settings in various formats.

mod json;
mod pretty;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::FocusError;
use crate::features::focus::{PolicyConfig, SessionRecord, SessionSummary, TimerMode};

pub use json::*;
pub use pretty::*;

/// Effective settings shown by `config show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsView {
    /// Data directory in use
    pub data_dir: String,
    /// Mode selected last
    pub last_mode: TimerMode,
    /// Time Free Focus bounds
    pub tff: PolicyConfig,
    /// Default Pomodoro work length
    pub pomodoro_work_minutes: u32,
    /// Default Pomodoro rest length
    pub pomodoro_rest_minutes: u32,
    /// Drive loop period
    pub poll_interval_ms: u64,
    /// Whether the terminal bell rings on phase changes
    pub bell: bool,
}

/// Format session history based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_history(
    records: &[SessionRecord],
    title: &str,
    format: OutputFormat,
) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_history_pretty(records, title)),
        OutputFormat::Json => format_history_json(records, title),
    }
}

/// Format a single session based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_record(record: &SessionRecord, format: OutputFormat) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_record_pretty(record)),
        OutputFormat::Json => to_json(record),
    }
}

/// Format a history summary based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_summary(summary: &SessionSummary, format: OutputFormat) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary)),
        OutputFormat::Json => to_json(summary),
    }
}

/// Format effective settings based on output format
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_settings(view: &SettingsView, format: OutputFormat) -> Result<String, FocusError> {
    match format {
        OutputFormat::Pretty => Ok(format_settings_pretty(view)),
        OutputFormat::Json => to_json(view),
    }
}
