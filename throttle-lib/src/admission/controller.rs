use crate::scope::ScopeConfig;
use crate::snapshot::SnapshotProvider;
use crate::{AdmissionRequest, Decision, ErrorKind, Rejection, Result, WorkerRecord};

/// Returns `true` if a worker serving `worker_url` handles the same resource
/// class as a request for `request_url`.
///
/// Only the first `request_url.len()` bytes of the worker URL are compared,
/// so a worker on `/foobar` matches a request for `/foo`, while a worker on
/// `/fo` does not.
#[must_use]
pub fn url_matches(worker_url: &str, request_url: &str) -> bool {
    worker_url.as_bytes().starts_with(request_url.as_bytes())
}

/// Count the workers busy with a limited method on a URL matching `request`
#[must_use]
pub fn count_active_matching(
    request: &AdmissionRequest,
    config: &ScopeConfig,
    snapshot: &[WorkerRecord],
) -> usize {
    snapshot
        .iter()
        .filter(|worker| {
            worker.status.is_serving()
                && config.limited_methods().contains(worker.method)
                && url_matches(&worker.url, &request.url)
        })
        .count()
}

/// Decide on one request against a snapshot that is already at hand
///
/// This is a pure function of its inputs and never logs.
#[must_use]
pub fn decide(
    request: &AdmissionRequest,
    config: &ScopeConfig,
    snapshot: &[WorkerRecord],
) -> Decision {
    if !config.limited_methods().contains(request.method) {
        return Decision::Admit;
    }

    let active = count_active_matching(request, config, snapshot);

    // The request being decided on is not in the snapshot yet
    if active + 1 > config.max_concurrent() {
        Decision::Reject(Rejection {
            url: request.url.clone(),
            max_concurrent: config.max_concurrent(),
            active,
        })
    } else {
        Decision::Admit
    }
}

/// Admission control on top of a worker state provider
///
/// The controller keeps no counters. Each call reads a fresh snapshot, so
/// requests admitted a moment ago by another thread may not be visible yet,
/// and finished ones may still be. Both are accepted.
#[derive(Debug, Clone, Default)]
pub struct AdmissionController<P> {
    provider: P,
}

impl<P: SnapshotProvider> AdmissionController<P> {
    /// Create a controller reading worker state from `provider`
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The worker state provider
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Decide whether `request` may proceed under `config`
    ///
    /// Rejections and errors are logged before they are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::SnapshotUnavailable`] if worker state is not
    /// visible, or the provider's error if the snapshot cannot be read. The
    /// caller answers both with an internal server error.
    pub fn decide(&self, request: &AdmissionRequest, config: &ScopeConfig) -> Result<Decision> {
        if !config.limited_methods().contains(request.method) {
            log::trace!("{request}: method not limited, admitting");
            return Ok(Decision::Admit);
        }

        if !self.provider.is_available() {
            let err = ErrorKind::SnapshotUnavailable;
            err.log_event().emit();
            return Err(err);
        }

        let snapshot = self
            .provider
            .current_snapshot()
            .inspect_err(|e| e.log_event().emit())?;

        let decision = decide(request, config, &snapshot);
        match decision.log_event() {
            Some(event) => event.emit(),
            None => log::debug!(
                "{request}: admitted, MaxConcurrentReqs {}",
                config.max_concurrent()
            ),
        }
        Ok(decision)
    }
}
