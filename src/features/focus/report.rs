//! Session history summaries.
//!
//! Aggregates sealed `SessionRecord`s for the `history` and `summary` commands.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::session::{SessionRecord, TimerMode};

/// Report time period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPeriod {
    /// Sessions started today (local time)
    Today,
    /// Last 7 days including today
    Week,
    /// Last 30 days including today
    Month,
    /// Everything in the log
    #[default]
    AllTime,
}

impl ReportPeriod {
    /// Parse a period name. Unknown names are `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "today" | "t" | "d" => Some(Self::Today),
            "week" | "w" | "7d" => Some(Self::Week),
            "month" | "m" | "30d" => Some(Self::Month),
            "all" | "alltime" | "all-time" => Some(Self::AllTime),
            _ => None,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
            Self::AllTime => "All Time",
        }
    }

    /// First local date inside the period, relative to `today`.
    #[must_use]
    pub fn first_day(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Today => Some(today),
            Self::Week => Some(today - Duration::days(6)),
            Self::Month => Some(today - Duration::days(29)),
            Self::AllTime => None,
        }
    }

    /// Whether a session started at `start` falls inside the period.
    #[must_use]
    pub fn contains(&self, start: DateTime<Utc>, today: NaiveDate) -> bool {
        self.first_day(today).map_or(true, |first| {
            let day = start.with_timezone(&Local).date_naive();
            day >= first && day <= today
        })
    }
}

/// Totals for one mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTotals {
    /// Mode name
    pub mode: TimerMode,
    /// Sessions in this mode
    pub sessions: usize,
    /// Work minutes in this mode
    pub work_minutes: i64,
}

/// Work time per local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    /// Date (YYYY-MM-DD)
    pub date: String,
    /// Sessions started that day
    pub sessions: usize,
    /// Work minutes that day
    pub work_minutes: i64,
}

/// How often a distraction cause was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseCount {
    /// Cause as entered (trimmed)
    pub cause: String,
    /// Number of distractions with this cause
    pub count: usize,
}

/// Aggregate view of a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Period name
    pub period: String,
    /// Number of sessions
    pub sessions: usize,
    /// Sessions that ran through Rest
    pub completed: usize,
    /// Sessions stopped by hand
    pub stopped_manually: usize,
    /// Total planned work minutes
    pub total_work_minutes: i64,
    /// Total rest minutes
    pub total_rest_minutes: i64,
    /// Mean work minutes per session
    pub avg_work_minutes: f64,
    /// Longest work phase in minutes
    pub longest_work_minutes: i64,
    /// Distractions recorded
    pub distractions: usize,
    /// Per-mode totals
    pub by_mode: Vec<ModeTotals>,
    /// Most frequent distraction causes, most frequent first
    pub top_causes: Vec<CauseCount>,
    /// Per-day totals, oldest first
    pub daily: Vec<DailyTotals>,
}

/// Number of causes kept in `top_causes`.
const TOP_CAUSES: usize = 5;

impl SessionSummary {
    /// Summarize sessions inside `period`.
    #[must_use]
    pub fn generate(records: &[SessionRecord], period: ReportPeriod) -> Self {
        let today = Local::now().date_naive();
        let selected: Vec<&SessionRecord> = records
            .iter()
            .filter(|r| period.contains(r.start_time, today))
            .collect();
        let mut summary = Self::from_records(&selected);
        summary.period = period.display_name().to_string();
        summary
    }

    /// Summarize exactly the given sessions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[&SessionRecord]) -> Self {
        let sessions = records.len();
        let stopped_manually = records.iter().filter(|r| r.stopped_manually).count();
        let total_work_minutes: i64 = records.iter().map(|r| r.work_duration.num_minutes()).sum();
        let total_rest_minutes: i64 = records.iter().map(|r| r.rest_duration.num_minutes()).sum();
        let longest_work_minutes = records
            .iter()
            .map(|r| r.work_duration.num_minutes())
            .max()
            .unwrap_or(0);
        let avg_work_minutes = if sessions > 0 {
            total_work_minutes as f64 / sessions as f64
        } else {
            0.0
        };

        let by_mode = TimerMode::ALL
            .iter()
            .map(|mode| {
                let in_mode = records.iter().filter(|r| r.mode == *mode);
                ModeTotals {
                    mode: *mode,
                    sessions: in_mode.clone().count(),
                    work_minutes: in_mode.map(|r| r.work_duration.num_minutes()).sum(),
                }
            })
            .filter(|totals| totals.sessions > 0)
            .collect();

        let mut causes: HashMap<String, usize> = HashMap::new();
        for distraction in records.iter().flat_map(|r| &r.distractions) {
            let cause = distraction.cause.trim();
            if !cause.is_empty() {
                *causes.entry(cause.to_string()).or_default() += 1;
            }
        }
        let mut top_causes: Vec<CauseCount> = causes
            .into_iter()
            .map(|(cause, count)| CauseCount { cause, count })
            .collect();
        top_causes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.cause.cmp(&b.cause)));
        top_causes.truncate(TOP_CAUSES);

        let mut days: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
        for record in records {
            let entry = days.entry(record.start_time_local().date_naive()).or_default();
            entry.0 += 1;
            entry.1 += record.work_duration.num_minutes();
        }
        let daily = days
            .into_iter()
            .map(|(date, (sessions, work_minutes))| DailyTotals {
                date: date.format("%Y-%m-%d").to_string(),
                sessions,
                work_minutes,
            })
            .collect();

        Self {
            period: ReportPeriod::AllTime.display_name().to_string(),
            sessions,
            completed: sessions - stopped_manually,
            stopped_manually,
            total_work_minutes,
            total_rest_minutes,
            avg_work_minutes,
            longest_work_minutes,
            distractions: records.iter().map(|r| r.distractions.len()).sum(),
            by_mode,
            top_causes,
            daily,
        }
    }
}

/// Most recent sessions first, optionally restricted to one mode.
#[must_use]
pub fn recent_sessions(
    records: &[SessionRecord],
    mode: Option<TimerMode>,
    limit: Option<usize>,
) -> Vec<SessionRecord> {
    records
        .iter()
        .rev()
        .filter(|r| mode.map_or(true, |m| r.mode == m))
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::focus::Distraction;
    use chrono::TimeZone;

    fn record(day: u32, work: i64, stopped: bool, mode: TimerMode, causes: &[&str]) -> SessionRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        SessionRecord {
            start_time: start,
            end_time: start + Duration::minutes(work + 5),
            work_duration: Duration::minutes(work),
            rest_duration: if stopped { Duration::zero() } else { Duration::minutes(5) },
            stopped_manually: stopped,
            mode,
            distractions: causes
                .iter()
                .map(|c| Distraction::new("work", *c, "meh", "ignore"))
                .collect(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let records = [
            record(1, 25, false, TimerMode::Pomodoro, &["email"]),
            record(1, 40, true, TimerMode::TimeFreeFocus, &["email", "phone"]),
            record(2, 30, false, TimerMode::TimeFreeFocus, &[" phone ", ""]),
        ];
        let refs: Vec<&SessionRecord> = records.iter().collect();
        let summary = SessionSummary::from_records(&refs);

        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.stopped_manually, 1);
        assert_eq!(summary.total_work_minutes, 95);
        assert_eq!(summary.total_rest_minutes, 10);
        assert_eq!(summary.longest_work_minutes, 40);
        assert_eq!(summary.distractions, 5);
        assert_eq!(summary.by_mode.len(), 2);
        assert_eq!(summary.by_mode[1].work_minutes, 70);
        assert_eq!(
            summary.top_causes,
            vec![
                CauseCount { cause: "email".to_string(), count: 2 },
                CauseCount { cause: "phone".to_string(), count: 2 },
            ]
        );
        assert_eq!(summary.daily.len(), 2);
    }

    #[test]
    fn test_empty_summary() {
        let summary = SessionSummary::from_records(&[]);
        assert_eq!(summary.sessions, 0);
        assert!(summary.avg_work_minutes.abs() < f64::EPSILON);
        assert!(summary.by_mode.is_empty());
    }

    #[test]
    fn test_period_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let inside = Local
            .with_ymd_and_hms(2024, 3, 5, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let outside = Local
            .with_ymd_and_hms(2024, 2, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);

        assert!(ReportPeriod::Week.contains(inside, today));
        assert!(!ReportPeriod::Today.contains(inside, today));
        assert!(!ReportPeriod::Month.contains(outside, today));
        assert!(ReportPeriod::AllTime.contains(outside, today));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(ReportPeriod::parse("week"), Some(ReportPeriod::Week));
        assert_eq!(ReportPeriod::parse("ALL"), Some(ReportPeriod::AllTime));
        assert_eq!(ReportPeriod::parse("fortnight"), None);
    }

    #[test]
    fn test_recent_sessions() {
        let records = vec![
            record(1, 25, false, TimerMode::Pomodoro, &[]),
            record(2, 30, false, TimerMode::TimeFreeFocus, &[]),
            record(3, 35, false, TimerMode::Pomodoro, &[]),
        ];

        let recent = recent_sessions(&records, None, Some(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].work_duration, Duration::minutes(35));

        let pomodoro = recent_sessions(&records, Some(TimerMode::Pomodoro), None);
        assert_eq!(pomodoro.len(), 2);
        assert!(pomodoro.iter().all(|r| r.mode == TimerMode::Pomodoro));
    }
}
