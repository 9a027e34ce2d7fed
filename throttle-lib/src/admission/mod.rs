//! Admission control for concurrent requests.
//!
//! Before a request is served, the server asks whether its scope still has
//! room for it. The answer is derived from a fresh snapshot of all workers:
//! every worker busy with a limited method on a URL starting with the
//! request's URL counts against the scope's ceiling. If the request would
//! exceed it, it is rejected with `503 Service Unavailable` instead of being
//! queued.
//!
//! - [`decide`]: the pure decision over a snapshot at hand
//! - [`AdmissionController`]: reads snapshots from a provider and logs
//! - [`Throttle`]: resolves the scope of a request first

mod controller;

pub use controller::{AdmissionController, count_active_matching, decide, url_matches};

use http::StatusCode;

use crate::scope::ScopeConfigs;
use crate::snapshot::SnapshotProvider;
use crate::{AdmissionRequest, Decision, Result};

/// Scope registry and admission controller in one
#[derive(Debug, Clone)]
pub struct Throttle<P> {
    scopes: ScopeConfigs,
    controller: AdmissionController<P>,
}

impl<P: SnapshotProvider> Throttle<P> {
    /// Create a throttle enforcing `scopes` with worker state from `provider`
    pub const fn new(scopes: ScopeConfigs, provider: P) -> Self {
        Self {
            scopes,
            controller: AdmissionController::new(provider),
        }
    }

    /// The configured scopes
    pub const fn scopes(&self) -> &ScopeConfigs {
        &self.scopes
    }

    /// The underlying controller
    pub const fn controller(&self) -> &AdmissionController<P> {
        &self.controller
    }

    /// Decide on a request
    ///
    /// Requests outside of every configured scope are admitted.
    ///
    /// # Errors
    ///
    /// See [`AdmissionController::decide`].
    pub fn check(&self, request: &AdmissionRequest) -> Result<Decision> {
        match self.scopes.resolve(&request.url) {
            Some((location, config)) => {
                log::trace!("{request}: governed by scope `{location}`");
                self.controller.decide(request, config)
            }
            None => Ok(Decision::Admit),
        }
    }

    /// Decide on an [`http::Request`]
    ///
    /// # Errors
    ///
    /// See [`AdmissionController::decide`].
    pub fn check_request<B>(&self, request: &http::Request<B>) -> Result<Decision> {
        self.check(&AdmissionRequest::from(request))
    }
}

/// Map the outcome of a check to the status a server must answer with
///
/// `None` means the request continues normally.
#[must_use]
pub fn terminal_status(outcome: &Result<Decision>) -> Option<StatusCode> {
    match outcome {
        Ok(decision) => decision.status_code(),
        Err(e) => Some(e.status_code()),
    }
}
