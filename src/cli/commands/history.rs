//! Session history commands.

use crate::cli::args::{ModeArg, OutputFormat};
use crate::config::Paths;
use crate::error::FocusError;
use crate::features::focus::{recent_sessions, ReportPeriod, SessionSummary};
use crate::output::{format_history, format_record, format_summary, to_json};
use crate::storage::{JsonSessionLog, SessionLog};

/// Execute the history command.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn history(
    paths: &Paths,
    limit: usize,
    mode: Option<ModeArg>,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let log = JsonSessionLog::new(paths.session_log.clone());
    let records = recent_sessions(&log.load(), mode.map(Into::into), Some(limit));
    format_history(&records, "History", format)
}

/// Execute the last command.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn last(paths: &Paths, format: OutputFormat) -> Result<String, FocusError> {
    let log = JsonSessionLog::new(paths.session_log.clone());
    match (log.load().last(), format) {
        (Some(record), _) => format_record(record, format),
        (None, OutputFormat::Json) => to_json(&serde_json::Value::Null),
        (None, OutputFormat::Pretty) => Ok("No sessions recorded".to_string()),
    }
}

/// Execute the summary command.
///
/// # Errors
///
/// Returns `FocusError::Validation` for an unknown period, or an error if
/// output formatting fails.
pub fn summary(paths: &Paths, period: &str, format: OutputFormat) -> Result<String, FocusError> {
    let period = ReportPeriod::parse(period).ok_or_else(|| {
        FocusError::Validation(format!(
            "Unknown period: {period}. Supported: today, week, month, all"
        ))
    })?;
    let log = JsonSessionLog::new(paths.session_log.clone());
    let summary = SessionSummary::generate(&log.load(), period);
    format_summary(&summary, format)
}
