//! Read access to the server's worker state table.
//!
//! The admission controller never owns worker state. It asks a
//! [`SnapshotProvider`] for a fresh point-in-time copy on every decision.
//!
//! - [`Scoreboard`]: in-process table updated by the workers themselves
//! - [`ScoreboardFile`]: a JSON dump of such a table, re-read on every call
//! - [`Unavailable`]: run modes without shared worker state

mod file;
mod scoreboard;

use std::sync::Arc;

pub use file::{ScoreEntry, ScoreboardFile};
pub use scoreboard::{REQUEST_LINE_LEN, Scoreboard, SlotGuard};

use crate::{ErrorKind, Result, WorkerRecord};

/// A source of worker state snapshots
pub trait SnapshotProvider {
    /// Returns `true` if worker state is visible in the current run mode
    fn is_available(&self) -> bool;

    /// Read the state of all workers.
    ///
    /// Every call reads afresh. The result holds at most one record per
    /// worker the server can run.
    ///
    /// # Errors
    ///
    /// Fails if the table cannot be read.
    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>>;
}

/// Provider for servers started without a shared worker table, e.g. from
/// inetd.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unavailable;

impl SnapshotProvider for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        Err(ErrorKind::SnapshotUnavailable)
    }
}

/// A fixed set of records, always available
impl SnapshotProvider for [WorkerRecord] {
    fn is_available(&self) -> bool {
        true
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        Ok(self.to_vec())
    }
}

impl SnapshotProvider for Vec<WorkerRecord> {
    fn is_available(&self) -> bool {
        true
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        Ok(self.clone())
    }
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for &T {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        (**self).current_snapshot()
    }
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        (**self).current_snapshot()
    }
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        (**self).current_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MethodId, WorkerStatus};

    #[test]
    fn test_unavailable() {
        assert!(!Unavailable.is_available());
        assert_eq!(
            Unavailable.current_snapshot(),
            Err(ErrorKind::SnapshotUnavailable)
        );
    }

    #[test]
    fn test_static_records() {
        let records = vec![WorkerRecord::new(
            WorkerStatus::BusyRead,
            MethodId::Get,
            "/api/x",
        )];
        let shared: Arc<dyn SnapshotProvider> = Arc::new(records.clone());
        assert!(shared.is_available());
        assert_eq!(shared.current_snapshot().unwrap(), records);
        assert_eq!(records.as_slice().current_snapshot().unwrap(), records);
    }

    #[test]
    fn test_boxed_provider() {
        let boxed: Box<dyn SnapshotProvider> = Box::new(Unavailable);
        assert!(!boxed.is_available());
        assert_eq!(
            boxed.current_snapshot(),
            Err(ErrorKind::SnapshotUnavailable)
        );
    }
}
