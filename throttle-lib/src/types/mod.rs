#![allow(unreachable_pub)]

mod decision;
mod error;
mod method;
mod request;
mod worker;

pub use decision::{CRITICAL_TARGET, Decision, LogEvent, Rejection, Severity};
pub use error::ErrorKind;
pub use method::{MethodId, MethodSet};
pub use request::AdmissionRequest;
pub use worker::{WorkerRecord, WorkerStatus};

/// The throttle `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
