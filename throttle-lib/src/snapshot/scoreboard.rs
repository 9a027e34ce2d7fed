use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::SnapshotProvider;
use crate::{ErrorKind, Result, WorkerRecord, WorkerStatus};

/// Bytes of the request line kept per slot; longer lines are cut off
pub const REQUEST_LINE_LEN: usize = 63;

/// In-process worker state table with one slot per worker
///
/// Workers record what they are doing; the admission controller reads a
/// copy of all slots. Readers never see a half-written slot, but a copy may
/// be stale by the time it is used.
#[derive(Debug)]
pub struct Scoreboard {
    slots: RwLock<Vec<WorkerRecord>>,
}

impl Scoreboard {
    /// Create a scoreboard with `server_limit` idle slots
    #[must_use]
    pub fn new(server_limit: usize) -> Self {
        Self {
            slots: RwLock::new(vec![WorkerRecord::default(); server_limit]),
        }
    }

    /// Number of slots
    #[must_use]
    pub fn server_limit(&self) -> usize {
        self.read().len()
    }

    /// Record the state of a worker
    ///
    /// `request_line` is the raw first line of the request being served,
    /// e.g. `GET /index.html HTTP/1.1`.
    ///
    /// # Errors
    ///
    /// Fails if `slot` is beyond the server limit.
    pub fn update(&self, slot: usize, status: WorkerStatus, request_line: &str) -> Result<()> {
        let record = WorkerRecord::from_request_line(status, truncate_request_line(request_line));
        let mut slots = self.write();
        let limit = slots.len();
        let entry = slots
            .get_mut(slot)
            .ok_or(ErrorKind::SlotOutOfRange { slot, limit })?;
        *entry = record;
        Ok(())
    }

    /// Change the status of a worker, keeping its request
    ///
    /// # Errors
    ///
    /// Fails if `slot` is beyond the server limit.
    pub fn set_status(&self, slot: usize, status: WorkerStatus) -> Result<()> {
        let mut slots = self.write();
        let limit = slots.len();
        let entry = slots
            .get_mut(slot)
            .ok_or(ErrorKind::SlotOutOfRange { slot, limit })?;
        entry.status = status;
        Ok(())
    }

    /// Occupy the first idle slot for a request that starts being read
    ///
    /// The slot goes back to idle when the returned guard is dropped.
    /// Returns `None` if every slot is taken.
    pub fn claim(&self, request_line: &str) -> Option<SlotGuard<'_>> {
        let record = WorkerRecord::from_request_line(
            WorkerStatus::BusyRead,
            truncate_request_line(request_line),
        );
        let mut slots = self.write();
        let slot = slots
            .iter()
            .position(|entry| entry.status == WorkerStatus::Idle)?;
        slots[slot] = record;
        Some(SlotGuard { board: self, slot })
    }

    fn release(&self, slot: usize) {
        if let Some(entry) = self.write().get_mut(slot) {
            *entry = WorkerRecord::default();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<WorkerRecord>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<WorkerRecord>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotProvider for Scoreboard {
    fn is_available(&self) -> bool {
        true
    }

    fn current_snapshot(&self) -> Result<Vec<WorkerRecord>> {
        Ok(self.read().clone())
    }
}

/// A slot held by a request in flight
#[derive(Debug)]
pub struct SlotGuard<'a> {
    board: &'a Scoreboard,
    slot: usize,
}

impl SlotGuard<'_> {
    /// Index of the held slot
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Move the request to another phase, e.g. from reading to writing
    pub fn set_status(&self, status: WorkerStatus) {
        if let Some(entry) = self.board.write().get_mut(self.slot) {
            entry.status = status;
        }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.board.release(self.slot);
    }
}

fn truncate_request_line(line: &str) -> &str {
    if line.len() <= REQUEST_LINE_LEN {
        return line;
    }
    let mut end = REQUEST_LINE_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_scoreboard_is_idle() {
        let board = Scoreboard::new(4);
        assert_eq!(board.server_limit(), 4);
        let snapshot = board.current_snapshot().unwrap();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|r| r.status == WorkerStatus::Idle));
    }

    #[test]
    fn test_update() {
        let board = Scoreboard::new(2);
        board
            .update(1, WorkerStatus::BusyWrite, "POST /upload HTTP/1.1")
            .unwrap();

        let snapshot = board.current_snapshot().unwrap();
        assert_eq!(
            snapshot[1],
            WorkerRecord::new(WorkerStatus::BusyWrite, MethodId::Post, "/upload")
        );
        assert_eq!(snapshot[0], WorkerRecord::default());
    }

    #[test]
    fn test_update_out_of_range() {
        let board = Scoreboard::new(2);
        assert_eq!(
            board.update(2, WorkerStatus::BusyRead, "GET / HTTP/1.1"),
            Err(ErrorKind::SlotOutOfRange { slot: 2, limit: 2 })
        );
    }

    #[test]
    fn test_claim_and_release() {
        let board = Scoreboard::new(2);
        let first = board.claim("GET /a HTTP/1.1").unwrap();
        let second = board.claim("GET /b HTTP/1.1").unwrap();
        assert_eq!((first.slot(), second.slot()), (0, 1));
        assert!(board.claim("GET /c HTTP/1.1").is_none());

        second.set_status(WorkerStatus::BusyWrite);
        assert_eq!(
            board.current_snapshot().unwrap()[1].status,
            WorkerStatus::BusyWrite
        );

        drop(first);
        let snapshot = board.current_snapshot().unwrap();
        assert_eq!(snapshot[0], WorkerRecord::default());
        assert_eq!(snapshot[1].url, "/b");

        let third = board.claim("GET /c HTTP/1.1").unwrap();
        assert_eq!(third.slot(), 0);
    }

    #[test]
    fn test_guard_status_keeps_request() {
        let board = Scoreboard::new(1);
        let slot = board.claim("POST /upload HTTP/1.1").unwrap();
        slot.set_status(WorkerStatus::BusyKeepalive);
        assert_eq!(
            board.current_snapshot().unwrap(),
            vec![WorkerRecord::new(
                WorkerStatus::BusyKeepalive,
                MethodId::Post,
                "/upload"
            )]
        );
    }

    #[test]
    fn test_long_request_lines_are_truncated() {
        let board = Scoreboard::new(1);
        let url = format!("/{}", "a".repeat(100));
        board
            .update(0, WorkerStatus::BusyRead, &format!("GET {url} HTTP/1.1"))
            .unwrap();

        let record = &board.current_snapshot().unwrap()[0];
        assert_eq!(record.url.len(), REQUEST_LINE_LEN - "GET ".len());
        assert!(url.starts_with(&record.url));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let line = format!("GET /{}", "é".repeat(40));
        let truncated = truncate_request_line(&line);
        assert!(truncated.len() <= REQUEST_LINE_LEN);
        assert!(line.starts_with(truncated));
    }
}
