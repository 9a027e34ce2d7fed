use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::MethodId;

/// What a worker is doing at the sampling instant
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkerStatus {
    /// Alive, waiting for a connection
    #[default]
    Idle,
    /// Reading a request
    BusyRead,
    /// Writing a response
    BusyWrite,
    /// Holding a keep-alive connection open
    BusyKeepalive,
    /// Starting, stopping, logging, resolving names...
    Other,
}

impl WorkerStatus {
    /// Returns `true` if the worker is actively serving a request.
    ///
    /// Only these workers count towards a concurrency ceiling.
    #[must_use]
    pub const fn is_serving(self) -> bool {
        matches!(self, Self::BusyRead | Self::BusyWrite | Self::BusyKeepalive)
    }
}

/// One entry of a worker state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerRecord {
    /// Current activity
    pub status: WorkerStatus,
    /// Method of the request being handled, meaningless when idle
    pub method: MethodId,
    /// URL of that request, as stored (possibly truncated)
    pub url: String,
}

impl WorkerRecord {
    /// Create a new record
    #[must_use]
    pub fn new(status: WorkerStatus, method: MethodId, url: impl Into<String>) -> Self {
        Self {
            status,
            method,
            url: url.into(),
        }
    }

    /// Build a record from a raw request line such as `GET /index.html HTTP/1.1`.
    ///
    /// The first whitespace-separated word is the method and the second one
    /// the URL. Missing words leave the method `Invalid` and the URL empty.
    #[must_use]
    pub fn from_request_line(status: WorkerStatus, line: &str) -> Self {
        let mut words = line.split_whitespace();
        let method = words.next().map_or(MethodId::Invalid, MethodId::from_token);
        let url = words.next().unwrap_or_default();
        Self::new(status, method, url)
    }
}
