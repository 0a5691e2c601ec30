//! JSON file helpers shared by the stores.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::FocusError;

/// Outcome of reading a JSON file.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    /// No file (or an empty one)
    Missing,
    /// Parsed successfully
    Parsed(T),
    /// Present but unreadable or unparseable
    Corrupt,
}

/// Read and parse `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> ReadOutcome<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            return ReadOutcome::Corrupt;
        }
    };

    if contents.trim().is_empty() {
        return ReadOutcome::Missing;
    }

    match serde_json::from_str(&contents) {
        Ok(value) => ReadOutcome::Parsed(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse file");
            ReadOutcome::Corrupt
        }
    }
}

/// Serialize `value` and replace `path` with it.
///
/// Writes a sibling temp file first so a crash never leaves a half-written file.
///
/// # Errors
///
/// Returns `FocusError::Storage` on serialization or I/O failure.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<(), FocusError> {
    let contents = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| FocusError::Storage(format!("Failed to serialize {}: {e}", path.display())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FocusError::Storage(format!("Failed to create directory {}: {e}", parent.display()))
        })?;
    }

    let tmp = sibling(path, "tmp");
    fs::write(&tmp, contents)
        .map_err(|e| FocusError::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| FocusError::Storage(format!("Failed to replace {}: {e}", path.display())))
}

/// Move an unparseable file aside so a rewrite does not destroy it.
pub fn quarantine(path: &Path) {
    let target = sibling(path, "corrupt");
    match fs::rename(path, &target) {
        Ok(()) => warn!(
            path = %path.display(),
            moved_to = %target.display(),
            "moved unreadable file aside"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to move unreadable file aside"),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        assert!(matches!(read_json::<Vec<u32>>(&path), ReadOutcome::Missing));

        fs::write(&path, "  \n").unwrap();
        assert!(matches!(read_json::<Vec<u32>>(&path), ReadOutcome::Missing));
    }

    #[test]
    fn test_read_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_json::<Vec<u32>>(&path), ReadOutcome::Corrupt));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("x.json");
        write_json(&path, &vec![1, 2, 3], true).unwrap();

        match read_json::<Vec<u32>>(&path) {
            ReadOutcome::Parsed(v) => assert_eq!(v, vec![1, 2, 3]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!sibling(&path, "tmp").exists());
    }

    #[test]
    fn test_quarantine_moves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(&path, "garbage").unwrap();

        quarantine(&path);

        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("sessions.json.corrupt")).unwrap(),
            "garbage"
        );
    }
}
