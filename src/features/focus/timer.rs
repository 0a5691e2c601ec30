//! Timer phases and countdown helpers.
//!
//! Provides the phase enum, wall-clock countdown arithmetic and
//! duration parsing/formatting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Current timer phase.
///
/// Exactly one phase is active at any instant. `Idle` is both the initial
/// state and the state between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// No session is running
    #[default]
    Idle,
    /// Work countdown is running
    Work,
    /// Rest countdown is running
    Rest,
}

impl TimerPhase {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Work => "Work",
            Self::Rest => "Rest",
        }
    }

    /// Check if a countdown is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Work | Self::Rest)
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Time left until `target_end`, clamped to zero.
#[must_use]
pub fn remaining_until(target_end: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let left = target_end.signed_duration_since(now);
    if left < Duration::zero() {
        Duration::zero()
    } else {
        left
    }
}

/// Progress through a phase as a fraction (0.0 - 1.0).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(total: Duration, remaining: Duration) -> f64 {
    let total_ms = total.num_milliseconds();
    if total_ms <= 0 {
        return 1.0;
    }
    let done = (total_ms - remaining.num_milliseconds()).clamp(0, total_ms);
    done as f64 / total_ms as f64
}

/// Format a duration as MM:SS, rounding partial seconds up.
///
/// A countdown showing 00:00 has actually finished.
#[must_use]
pub fn format_duration_mmss(d: Duration) -> String {
    let millis = d.num_milliseconds().max(0);
    let total_seconds = (millis + 999) / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes();

    if total_minutes < 1 {
        let seconds = d.num_seconds();
        return format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" });
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{}, {} minute{}",
                hours,
                if hours == 1 { "" } else { "s" },
                minutes,
                if minutes == 1 { "" } else { "s" }
            )
        } else {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    }
}

/// Format a duration as a short string (e.g., "25m", "1h 30m").
#[must_use]
pub fn format_duration_short(d: Duration) -> String {
    let total_minutes = d.num_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
