use http::StatusCode;
use serde::Serialize;
use std::fmt;
use strum::Display;

/// Log target used for critical events.
///
/// The `log` facade stops at `error`, so critical events are logged at that
/// level under this target, which lets operators route them separately.
pub const CRITICAL_TARGET: &str = "throttle::critical";

/// How loud a [`LogEvent`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// A request was turned away by policy
    Error,
    /// The server is misconfigured for throttling
    Critical,
}

/// A message to report through the server's error log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    /// Severity of the event
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
}

impl LogEvent {
    /// Create a new log event
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Write the event to the `log` facade
    pub fn emit(&self) {
        match self.severity {
            Severity::Error => log::error!("{}", self.message),
            Severity::Critical => log::error!(target: CRITICAL_TARGET, "{}", self.message),
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Details of a request turned away because its scope is saturated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// URL of the rejected request
    pub url: String,
    /// The configured ceiling of the scope
    pub max_concurrent: usize,
    /// Matching requests that were in flight when the decision was made
    pub active: usize,
}

impl Rejection {
    /// Short reason, suitable for a response body
    pub const REASON: &'static str = "concurrency ceiling reached";

    /// The log event describing this rejection
    #[must_use]
    pub fn log_event(&self) -> LogEvent {
        LogEvent::new(Severity::Error, self.to_string())
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "client access to {} deferred, MaxConcurrentReqs {} reached",
            self.url, self.max_concurrent
        )
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    /// The request may proceed
    Admit,
    /// The request must be answered with `503 Service Unavailable`
    Reject(Rejection),
}

impl Decision {
    /// Returns `true` if the request may proceed
    #[must_use]
    pub const fn is_admit(&self) -> bool {
        matches!(self, Self::Admit)
    }

    /// Returns `true` if the request was turned away
    #[must_use]
    pub const fn is_reject(&self) -> bool {
        matches!(self, Self::Reject(_))
    }

    /// The terminal status a server answers with, `None` to continue normally
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Admit => None,
            Self::Reject(_) => Some(StatusCode::SERVICE_UNAVAILABLE),
        }
    }

    /// The event to log for this decision, if any
    #[must_use]
    pub fn log_event(&self) -> Option<LogEvent> {
        match self {
            Self::Admit => None,
            Self::Reject(rejection) => Some(rejection.log_event()),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admit => write!(f, "admit"),
            Self::Reject(rejection) => write!(f, "reject: {} ({rejection})", Rejection::REASON),
        }
    }
}
