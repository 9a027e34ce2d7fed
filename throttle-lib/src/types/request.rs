use std::fmt;

use crate::MethodId;

/// The parts of an incoming request an admission check looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionRequest {
    /// Method identifier of the request
    pub method: MethodId,
    /// URL path as received, without query string
    pub url: String,
}

impl AdmissionRequest {
    /// Create a new admission request
    #[must_use]
    pub fn new(method: impl Into<MethodId>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

impl<B> From<&http::Request<B>> for AdmissionRequest {
    fn from(request: &http::Request<B>) -> Self {
        Self::new(request.method(), request.uri().path())
    }
}

impl fmt::Display for AdmissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
