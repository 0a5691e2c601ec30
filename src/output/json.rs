//! JSON output formatting for tffocus.
//!
//! This module provides functions for formatting session data as JSON.

use serde::Serialize;
use serde_json::json;

use crate::error::FocusError;
use crate::features::focus::SessionRecord;

/// Format session history as JSON
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn format_history_json(records: &[SessionRecord], title: &str) -> Result<String, FocusError> {
    let output = json!({
        "list": title,
        "count": records.len(),
        "items": records
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `FocusError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, FocusError> {
    Ok(serde_json::to_string_pretty(value)?)
}
