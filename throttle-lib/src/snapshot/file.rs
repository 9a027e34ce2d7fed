use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::SnapshotProvider;
use crate::{Result, WorkerRecord, WorkerStatus};

/// One slot of a scoreboard dump, e.g.
/// `{"status": "busy_read", "request": "GET /api/x HTTP/1.1"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Worker status
    pub status: WorkerStatus,
    /// Raw request line, empty for idle workers
    #[serde(default)]
    pub request: String,
}

impl From<ScoreEntry> for WorkerRecord {
    fn from(entry: ScoreEntry) -> Self {
        WorkerRecord::from_request_line(entry.status, &entry.request)
    }
}

/// A scoreboard dump on disk, read afresh on every snapshot
///
/// The dump is a JSON array of [`ScoreEntry`]. Worker state counts as
/// available as long as the file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardFile {
    path: PathBuf,
}

impl ScoreboardFile {
    /// Create a provider reading from `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the dump
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotProvider for ScoreboardFile {
    fn is_available(&self) -> bool {
        let available = self.path.is_file();
        if !available {
            log::warn!("Scoreboard dump `{}` not found", self.path.display());
        }
        available
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| (self.path.clone(), e))?;
        let entries: Vec<ScoreEntry> = serde_json::from_str(&contents)?;
        log::trace!(
            "Read {} scoreboard entries from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries.into_iter().map(WorkerRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MethodId};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_dump() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"status": "busy_read", "request": "GET /api/x HTTP/1.1"}},
                {{"status": "idle"}},
                {{"status": "busy_keepalive", "request": "POST /api/y HTTP/1.1"}}
            ]"#
        )
        .unwrap();

        let provider = ScoreboardFile::new(file.path());
        assert!(provider.is_available());
        assert_eq!(
            provider.current_snapshot().unwrap(),
            vec![
                WorkerRecord::new(WorkerStatus::BusyRead, MethodId::Get, "/api/x"),
                WorkerRecord::default(),
                WorkerRecord::new(WorkerStatus::BusyKeepalive, MethodId::Post, "/api/y"),
            ]
        );
    }

    #[test]
    fn test_reads_afresh() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        let provider = ScoreboardFile::new(file.path());
        assert!(provider.current_snapshot().unwrap().is_empty());

        fs::write(
            file.path(),
            r#"[{"status": "busy_write", "request": "GET / HTTP/1.0"}]"#,
        )
        .unwrap();
        assert_eq!(provider.current_snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let provider = ScoreboardFile::new("/nonexistent/scoreboard.json");
        assert!(!provider.is_available());
        assert!(matches!(
            provider.current_snapshot(),
            Err(ErrorKind::IoError(Some(_), _))
        ));
    }

    #[test]
    fn test_malformed_dump() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"status": "sleeping"}}]"#).unwrap();
        let provider = ScoreboardFile::new(file.path());
        assert!(matches!(
            provider.current_snapshot(),
            Err(ErrorKind::SnapshotParse(_))
        ));
    }

    #[test]
    fn test_fixture_dump() {
        let entries: Vec<ScoreEntry> =
            serde_json::from_str(&test_utils::load_fixture!("scoreboard.json")).unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(
            entries[2],
            ScoreEntry {
                status: WorkerStatus::Idle,
                request: String::new(),
            }
        );
        let serving = entries
            .into_iter()
            .map(WorkerRecord::from)
            .filter(|record| record.status.is_serving())
            .count();
        assert_eq!(serving, 4);
    }
}
