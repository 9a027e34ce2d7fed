use http::StatusCode;
use serde::{Serialize, Serializer};
use std::hash::Hash;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::{LogEvent, Severity};

/// Possible errors when interacting with `throttle_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The concurrency ceiling given to `MaxConcurrentReqs` is not a positive integer.
    #[error("MaxConcurrentReqs must be an integer greater than 0")]
    InvalidMaxConcurrent,
    /// The server limit must allow at least one worker
    #[error("Invalid server limit {0}: must be greater than 0")]
    InvalidServerLimit(usize),
    /// A limited method name is not one the server knows about
    #[error("Unknown method `{0}` in limited methods")]
    UnknownMethod(String),
    /// A scope location must be an absolute URL path
    #[error("Invalid scope location `{0}`: locations must start with `/`")]
    InvalidScopeLocation(String),
    /// The scope configuration file is not valid TOML or has unknown keys
    #[error("Failed to parse scope configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// The worker state table is not visible in the current run mode.
    ///
    /// Callers must answer the request with an internal server error rather
    /// than a throttle rejection.
    #[error("Server status unavailable in inetd mode")]
    SnapshotUnavailable,
    /// A scoreboard dump could not be decoded
    #[error("Failed to parse scoreboard dump: {0}")]
    SnapshotParse(#[from] serde_json::Error),
    /// A scoreboard slot index beyond the configured server limit
    #[error("Scoreboard slot {slot} out of range (server limit {limit})")]
    SlotOutOfRange {
        /// The requested slot
        slot: usize,
        /// Number of slots on the scoreboard
        limit: usize,
    },
    /// Any form of I/O error occurred while reading from a given path.
    #[error("Failed to read from path: `{}`, reason: {}", match .0 {
        Some(p) => p.to_str().unwrap_or("<MALFORMED PATH>"),
        None => "<MALFORMED PATH>",
    }, .1)]
    IoError(Option<PathBuf>, std::io::Error),
}

impl ErrorKind {
    /// The HTTP status a server should answer with when this error surfaces
    /// while handling a request.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Log event describing this error, with its severity.
    ///
    /// A missing worker state table points at server misconfiguration and is
    /// reported as critical; everything else is a plain error.
    #[must_use]
    pub fn log_event(&self) -> LogEvent {
        let severity = match self {
            Self::SnapshotUnavailable => Severity::Critical,
            _ => Severity::Error,
        };
        LogEvent::new(severity, self.to_string())
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::IoError(p1, e1), Self::IoError(p2, e2)) => p1 == p2 && e1.kind() == e2.kind(),
            (Self::UnknownMethod(m1), Self::UnknownMethod(m2)) => m1 == m2,
            (Self::InvalidServerLimit(l1), Self::InvalidServerLimit(l2)) => l1 == l2,
            (Self::InvalidScopeLocation(l1), Self::InvalidScopeLocation(l2)) => l1 == l2,
            (Self::ConfigParse(e1), Self::ConfigParse(e2)) => e1.to_string() == e2.to_string(),
            (Self::SnapshotParse(e1), Self::SnapshotParse(e2)) => e1.to_string() == e2.to_string(),
            (
                Self::SlotOutOfRange { slot: s1, limit: l1 },
                Self::SlotOutOfRange { slot: s2, limit: l2 },
            ) => s1 == s2 && l1 == l2,
            (Self::InvalidMaxConcurrent, Self::InvalidMaxConcurrent)
            | (Self::SnapshotUnavailable, Self::SnapshotUnavailable) => true,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        match self {
            Self::IoError(p, e) => (p, e.kind()).hash(state),
            Self::UnknownMethod(s) | Self::InvalidScopeLocation(s) => s.hash(state),
            Self::ConfigParse(e) => e.to_string().hash(state),
            Self::SnapshotParse(e) => e.to_string().hash(state),
            Self::SlotOutOfRange { slot, limit } => (slot, limit).hash(state),
            Self::InvalidServerLimit(limit) => limit.hash(state),
            Self::InvalidMaxConcurrent | Self::SnapshotUnavailable => {
                std::mem::discriminant(self).hash(state);
            }
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<(PathBuf, std::io::Error)> for ErrorKind {
    fn from(value: (PathBuf, std::io::Error)) -> Self {
        Self::IoError(Some(value.0), value.1)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(None, e)
    }
}
