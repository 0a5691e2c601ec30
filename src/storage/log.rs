//! Session history log.
//!
//! Persisted as an indented JSON array. Every append reads the whole log,
//! pushes the record and rewrites the file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::file::{quarantine, read_json, write_json, ReadOutcome};
use super::SessionLog;
use crate::error::FocusError;
use crate::features::focus::SessionRecord;

/// Session log backed by a JSON file.
#[derive(Debug)]
pub struct JsonSessionLog {
    path: PathBuf,
    // serializes read-modify-write between appends from this process
    write_lock: Mutex<()>,
}

impl JsonSessionLog {
    /// Create a log at `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionLog for JsonSessionLog {
    fn append(&self, record: &SessionRecord) -> Result<(), FocusError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = match read_json::<Vec<SessionRecord>>(&self.path) {
            ReadOutcome::Parsed(records) => records,
            ReadOutcome::Missing => Vec::new(),
            ReadOutcome::Corrupt => {
                quarantine(&self.path);
                Vec::new()
            }
        };

        records.push(record.clone());
        write_json(&self.path, &records, true)?;
        debug!(path = %self.path.display(), count = records.len(), "session log written");
        Ok(())
    }

    fn load(&self) -> Vec<SessionRecord> {
        match read_json(&self.path) {
            ReadOutcome::Parsed(records) => records,
            ReadOutcome::Missing | ReadOutcome::Corrupt => Vec::new(),
        }
    }
}

/// Session log held in memory.
#[derive(Debug, Default)]
pub struct MemorySessionLog {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemorySessionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records appended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionLog for MemorySessionLog {
    fn append(&self, record: &SessionRecord) -> Result<(), FocusError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn load(&self) -> Vec<SessionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::focus::{Distraction, TimerMode};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn record(minute: u32, stopped: bool) -> SessionRecord {
        SessionRecord {
            start_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, minute, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 1, 11, minute, 0).unwrap(),
            work_duration: Duration::minutes(25),
            rest_duration: if stopped { Duration::zero() } else { Duration::minutes(5) },
            stopped_manually: stopped,
            mode: TimerMode::TimeFreeFocus,
            distractions: vec![Distraction::new("reading", "noise", "annoyed", "headphones")],
        }
    }

    #[test]
    fn test_missing_file_then_one_append() {
        let dir = TempDir::new().unwrap();
        let log = JsonSessionLog::new(dir.path().join("sessions.json"));
        assert!(log.load().is_empty());

        log.append(&record(0, false)).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert!(contents.contains("\n  "), "log should be indented");
    }

    #[test]
    fn test_appends_preserve_order_and_round_trip() {
        let dir = TempDir::new().unwrap();
        let log = JsonSessionLog::new(dir.path().join("sessions.json"));
        let written = vec![record(0, false), record(1, true), record(2, false)];

        for r in &written {
            log.append(r).unwrap();
        }

        assert_eq!(log.load(), written);
    }

    #[test]
    fn test_sub_second_durations_round_trip() {
        let dir = TempDir::new().unwrap();
        let log = JsonSessionLog::new(dir.path().join("sessions.json"));
        let mut short = record(0, false);
        short.work_duration = Duration::milliseconds(1500);
        short.rest_duration = Duration::milliseconds(30);
        short.end_time = short.start_time + Duration::milliseconds(1530);

        log.append(&short).unwrap();

        assert_eq!(log.load(), vec![short]);
    }

    #[test]
    fn test_reads_focus_app_log_and_appends_to_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(
            &path,
            r#"[
  {
    "StartTime": "2024-06-01T10:00:00.5000000+00:00",
    "EndTime": "2024-06-01T10:30:00.5000000+00:00",
    "WorkDuration": "00:25:00",
    "RestDuration": "00:05:00",
    "StoppedManually": false,
    "Mode": "Pomodoro"
  }
]"#,
        )
        .unwrap();
        let log = JsonSessionLog::new(&path);

        let records = log.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mode, TimerMode::Pomodoro);
        assert_eq!(records[0].work_duration, Duration::minutes(25));
        assert_eq!(
            records[0].start_time,
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + Duration::milliseconds(500)
        );

        log.append(&record(40, true)).unwrap();
        assert_eq!(log.load().len(), 2);
        assert!(!dir.path().join("sessions.json.corrupt").exists());
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_is_set_aside_on_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "[{\"truncated\":").unwrap();
        let log = JsonSessionLog::new(&path);

        assert!(log.load().is_empty());

        log.append(&record(3, true)).unwrap();
        assert_eq!(log.load().len(), 1);
        assert!(dir.path().join("sessions.json.corrupt").exists());
    }

    #[test]
    fn test_unwritable_location_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let log = JsonSessionLog::new(blocker.join("sessions.json"));

        let err = log.append(&record(0, false)).unwrap_err();
        assert!(matches!(err, FocusError::Storage(_)));
    }

    #[test]
    fn test_memory_log() {
        let log = MemorySessionLog::new();
        assert!(log.is_empty());
        log.append(&record(0, false)).unwrap();
        log.append(&record(1, false)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.load()[1], record(1, false));
    }
}
