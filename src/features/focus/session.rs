//! Session records and distraction notes.
//!
//! A `SessionRecord` is sealed once per Work(+Rest) cycle and is never
//! modified after it reaches the session log.

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use super::timer::format_duration_short;

/// Scheduling mode a session ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimerMode {
    /// Fixed work and rest lengths
    #[default]
    Pomodoro,
    /// Randomized work and rest lengths within configured bounds
    #[serde(rename = "Time Free Focus")]
    TimeFreeFocus,
}

impl TimerMode {
    /// Every mode, in selector order.
    pub const ALL: [Self; 2] = [Self::Pomodoro, Self::TimeFreeFocus];

    /// Selector index persisted as `last_timer_mode`.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Pomodoro => 0,
            Self::TimeFreeFocus => 1,
        }
    }

    /// Mode for a persisted selector index. Unknown indexes fall back to Pomodoro.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index {
            1 => Self::TimeFreeFocus,
            _ => Self::Pomodoro,
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Pomodoro => "Pomodoro",
            Self::TimeFreeFocus => "Time Free Focus",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A note about an interruption captured during Work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distraction {
    /// What I was doing
    #[serde(alias = "Activity")]
    pub activity: String,
    /// What pulled me away
    #[serde(alias = "Cause", alias = "Distraction")]
    pub cause: String,
    /// How I felt
    #[serde(alias = "Feeling")]
    pub feeling: String,
    /// What I could do instead next time
    #[serde(alias = "Alternative")]
    pub alternative: String,
}

impl Distraction {
    /// Create a distraction note.
    #[must_use]
    pub fn new(
        activity: impl Into<String>,
        cause: impl Into<String>,
        feeling: impl Into<String>,
        alternative: impl Into<String>,
    ) -> Self {
        Self {
            activity: activity.into(),
            cause: cause.into(),
            feeling: feeling.into(),
            alternative: alternative.into(),
        }
    }

    /// True when every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [&self.activity, &self.cause, &self.feeling, &self.alternative]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

/// A sealed Work(+Rest) cycle as written to the session log.
///
/// Keys are written in snake_case. The PascalCase keys of FocusApp logs
/// are read as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When Work started
    #[serde(alias = "StartTime", deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    /// When the session completed or was stopped
    #[serde(alias = "EndTime", deserialize_with = "timestamp::deserialize")]
    pub end_time: DateTime<Utc>,
    /// Planned work length
    #[serde(alias = "WorkDuration", with = "duration_secs")]
    pub work_duration: Duration,
    /// Planned rest length (zero if Rest never began)
    #[serde(alias = "RestDuration", with = "duration_secs")]
    pub rest_duration: Duration,
    /// Whether the session ended by manual stop
    #[serde(alias = "StoppedManually")]
    pub stopped_manually: bool,
    /// Scheduling mode
    #[serde(alias = "Mode")]
    pub mode: TimerMode,
    /// Distractions captured during Work, in order
    #[serde(alias = "Distractions", default)]
    pub distractions: Vec<Distraction>,
}

impl SessionRecord {
    /// Wall-clock length of the session.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.end_time.signed_duration_since(self.start_time)
    }

    /// Get start time in local timezone.
    #[must_use]
    pub fn start_time_local(&self) -> DateTime<Local> {
        self.start_time.with_timezone(&Local)
    }

    /// Get end time in local timezone.
    #[must_use]
    pub fn end_time_local(&self) -> DateTime<Local> {
        self.end_time.with_timezone(&Local)
    }

    /// One-line summary for listings.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let outcome = if self.stopped_manually {
            "stopped"
        } else {
            "completed"
        };
        format!(
            "{} {} - work {} / rest {} ({outcome}, {} distraction{})",
            self.start_time_local().format("%Y-%m-%d %H:%M"),
            self.mode,
            format_duration_short(self.work_duration),
            format_duration_short(self.rest_duration),
            self.distractions.len(),
            if self.distractions.len() == 1 { "" } else { "s" }
        )
    }
}

/// Reader for timestamps in RFC 3339 or in the offset-less
/// `yyyy-mm-ddThh:mm:ss[.fffffff]` form FocusApp writes for local times.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer};

    /// Deserialize a timestamp, reading offset-less values as local time.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a recognizable timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {text}")))
    }

    /// Parse a timestamp. Local times in a DST gap are rejected; ambiguous
    /// ones resolve to the earlier instant.
    #[must_use]
    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

/// Serde codec storing a `chrono::Duration` as seconds.
///
/// Whole durations are written as integers and anything finer as
/// fractional seconds. Readers also accept the `[d.]hh:mm:ss[.fffffff]`
/// strings of FocusApp logs.
pub mod duration_secs {
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NANOS_PER_SEC: f64 = 1_000_000_000.0;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Fractional(f64),
        Text(String),
    }

    /// Serialize as integer seconds, or fractional seconds when the
    /// duration has a sub-second part.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::cast_precision_loss)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() == 0 {
            serializer.serialize_i64(value.num_seconds())
        } else {
            let secs = value.num_seconds() as f64 + f64::from(value.subsec_nanos()) / NANOS_PER_SEC;
            serializer.serialize_f64(secs)
        }
    }

    /// Deserialize from seconds or a clock-style string.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither a number nor a parseable string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Duration::seconds(secs)),
            Raw::Fractional(secs) => from_fractional(secs)
                .ok_or_else(|| de::Error::custom(format!("invalid duration: {secs}"))),
            Raw::Text(text) => parse_clock(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid duration: {text}"))),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_fractional(secs: f64) -> Option<Duration> {
        let nanos = (secs * NANOS_PER_SEC).round();
        // i64 nanoseconds cover about 292 years
        if !nanos.is_finite() || nanos.abs() >= 9.2e18 {
            return None;
        }
        Some(Duration::nanoseconds(nanos as i64))
    }

    /// Parse `[d.]hh:mm:ss[.fraction]`. Fraction digits past nanoseconds
    /// are dropped.
    #[must_use]
    pub fn parse_clock(text: &str) -> Option<Duration> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        let [head, minutes, seconds] = parts.as_slice() else {
            return None;
        };

        let (days, hours) = match head.split_once('.') {
            Some((d, h)) => (d.parse::<i64>().ok()?, h.parse::<i64>().ok()?),
            None => (0, head.parse::<i64>().ok()?),
        };
        let minutes = minutes.parse::<i64>().ok()?;
        let (whole, fraction) = match seconds.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (*seconds, ""),
        };
        let whole_seconds = whole.parse::<i64>().ok()?;

        Some(
            Duration::days(days)
                + Duration::hours(hours)
                + Duration::minutes(minutes)
                + Duration::seconds(whole_seconds)
                + Duration::nanoseconds(parse_fraction(fraction)?),
        )
    }

    fn parse_fraction(digits: &str) -> Option<i64> {
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut padded: String = digits.chars().take(9).collect();
        while padded.len() < 9 {
            padded.push('0');
        }
        padded.parse().ok()
    }
}
