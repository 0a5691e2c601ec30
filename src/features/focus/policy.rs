//! Duration policies.
//!
//! Two named variants pick Work/Rest lengths:
//! - `DurationPolicy::Fixed` (Pomodoro): caller-supplied constants.
//! - `DurationPolicy::Randomized` (Time Free Focus): work drawn uniformly
//!   from configured bounds; rest follows a `RestRule`, either another
//!   uniform range or a percentage of the work length.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::validate::{
    check_minutes, check_order, check_rest_percent, MIN_REST_MINUTES, MIN_WORK_MINUTES,
};
use crate::error::FocusError;

/// An inclusive, validated range of whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteRange {
    min: u32,
    max: u32,
}

impl MinuteRange {
    /// Build a range, checking `floor <= min <= max`.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Validation` for out-of-range or out-of-order bounds.
    pub fn new(min: u32, max: u32, label: &str, floor: u32) -> Result<Self, FocusError> {
        check_minutes(min, &format!("{label}-min"), floor)?;
        check_minutes(max, &format!("{label}-max"), floor)?;
        check_order(min, max, label)?;
        Ok(Self { min, max })
    }

    /// Lower bound in minutes.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound in minutes.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Draw a whole number of minutes uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl std::fmt::Display for MinuteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} min", self.min, self.max)
    }
}

/// Validated Time Free Focus bounds: `ConfigureTFF(work-min, work-max, rest-min, rest-max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TffBounds {
    /// Work range
    pub work: MinuteRange,
    /// Rest range
    pub rest: MinuteRange,
}

impl TffBounds {
    /// Validate all four bounds.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Validation` if any bound is below its floor or
    /// a minimum exceeds its maximum.
    pub fn new(work_min: u32, work_max: u32, rest_min: u32, rest_max: u32) -> Result<Self, FocusError> {
        Ok(Self {
            work: MinuteRange::new(work_min, work_max, "work", MIN_WORK_MINUTES)?,
            rest: MinuteRange::new(rest_min, rest_max, "rest", MIN_REST_MINUTES)?,
        })
    }
}

/// How Rest length is derived in Time Free Focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestRule {
    /// Uniform draw from an inclusive range
    Range(MinuteRange),
    /// `max(1, round(work_minutes * percent / 100))` minutes
    PercentOfWork(u32),
}

impl RestRule {
    /// Percent-of-work rule with a validated percentage.
    ///
    /// # Errors
    ///
    /// Returns `FocusError::Validation` for percentages outside 5..=20.
    pub fn percent(percent: u32) -> Result<Self, FocusError> {
        Ok(Self::PercentOfWork(check_rest_percent(percent)?))
    }

    /// Rest length following a work phase of length `work`.
    pub fn rest_for<R: Rng + ?Sized>(&self, work: Duration, rng: &mut R) -> Duration {
        match self {
            Self::Range(range) => Duration::minutes(i64::from(range.sample(rng))),
            Self::PercentOfWork(percent) => percent_of(work, *percent),
        }
    }
}

/// `percent`% of `work`, rounded to whole minutes, never below one minute.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn percent_of(work: Duration, percent: u32) -> Duration {
    let work_minutes = work.num_milliseconds() as f64 / 60_000.0;
    let minutes = (work_minutes * f64::from(percent) / 100.0).round() as i64;
    Duration::minutes(minutes.max(1))
}

/// Persisted Time Free Focus configuration.
///
/// Serialized flat as `{work_min, work_max, rest_min, rest_max}` or
/// `{work_min, work_max, rest_percent}`. Readers also take the PascalCase
/// keys of FocusApp files and fall back to defaults for missing or
/// invalid fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PolicyFile", into = "PolicyFile")]
pub struct PolicyConfig {
    /// Work range
    pub work: MinuteRange,
    /// Rest derivation
    pub rest: RestRule,
}

/// Default work bounds in minutes.
pub const DEFAULT_WORK: (u32, u32) = (20, 45);

/// Default rest bounds in minutes.
pub const DEFAULT_REST: (u32, u32) = (2, 10);

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            work: MinuteRange {
                min: DEFAULT_WORK.0,
                max: DEFAULT_WORK.1,
            },
            rest: RestRule::Range(MinuteRange {
                min: DEFAULT_REST.0,
                max: DEFAULT_REST.1,
            }),
        }
    }
}

impl From<TffBounds> for PolicyConfig {
    fn from(bounds: TffBounds) -> Self {
        Self {
            work: bounds.work,
            rest: RestRule::Range(bounds.rest),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PolicyFile {
    #[serde(alias = "WorkMin", skip_serializing_if = "Option::is_none")]
    work_min: Option<u32>,
    #[serde(alias = "WorkMax", skip_serializing_if = "Option::is_none")]
    work_max: Option<u32>,
    #[serde(alias = "RestMin", skip_serializing_if = "Option::is_none")]
    rest_min: Option<u32>,
    #[serde(alias = "RestMax", skip_serializing_if = "Option::is_none")]
    rest_max: Option<u32>,
    #[serde(alias = "RestPercent", skip_serializing_if = "Option::is_none")]
    rest_percent: Option<u32>,
}

impl From<PolicyFile> for PolicyConfig {
    fn from(file: PolicyFile) -> Self {
        let defaults = Self::default();

        let work = MinuteRange::new(
            file.work_min.unwrap_or(DEFAULT_WORK.0),
            file.work_max.unwrap_or(DEFAULT_WORK.1),
            "work",
            MIN_WORK_MINUTES,
        )
        .unwrap_or(defaults.work);

        let range = match (file.rest_min, file.rest_max) {
            (None, None) => None,
            (min, max) => MinuteRange::new(
                min.unwrap_or(DEFAULT_REST.0),
                max.unwrap_or(DEFAULT_REST.1),
                "rest",
                MIN_REST_MINUTES,
            )
            .ok(),
        };

        let rest = match (range, file.rest_percent) {
            (Some(range), _) => RestRule::Range(range),
            (None, Some(percent)) => RestRule::percent(percent).unwrap_or(defaults.rest),
            (None, None) => defaults.rest,
        };

        Self { work, rest }
    }
}

impl From<PolicyConfig> for PolicyFile {
    fn from(config: PolicyConfig) -> Self {
        let mut file = Self {
            work_min: Some(config.work.min),
            work_max: Some(config.work.max),
            ..Self::default()
        };
        match config.rest {
            RestRule::Range(range) => {
                file.rest_min = Some(range.min);
                file.rest_max = Some(range.max);
            }
            RestRule::PercentOfWork(percent) => file.rest_percent = Some(percent),
        }
        file
    }
}

/// The rule in force for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Pomodoro: constant work and rest lengths.
    Fixed {
        /// Work length
        work: Duration,
        /// Rest length
        rest: Duration,
    },
    /// Time Free Focus: randomized within configured bounds.
    Randomized(PolicyConfig),
}

impl DurationPolicy {
    /// Work length for a new session.
    pub fn sample_work<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match self {
            Self::Fixed { work, .. } => *work,
            Self::Randomized(config) => Duration::minutes(i64::from(config.work.sample(rng))),
        }
    }

    /// Rest length following a work phase of length `work`.
    pub fn rest_for<R: Rng + ?Sized>(&self, work: Duration, rng: &mut R) -> Duration {
        match self {
            Self::Fixed { rest, .. } => *rest,
            Self::Randomized(config) => config.rest.rest_for(work, rng),
        }
    }
}
