use serde::Serialize;

use crate::{ErrorKind, MethodSet, Result};

/// Number of workers the server can ever run.
///
/// Used as the ceiling of scopes that never set one, which leaves the cap
/// inert.
pub const DEFAULT_SERVER_LIMIT: usize = 256;

/// Throttling policy of one URL scope
///
/// Built while the configuration is loaded and left untouched afterwards.
/// A nested scope carries its own complete `ScopeConfig`; nothing is
/// inherited from the enclosing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeConfig {
    #[serde(rename = "methods")]
    limited_methods: MethodSet,
    #[serde(rename = "max_concurrent_reqs")]
    max_concurrent: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self::with_server_limit(DEFAULT_SERVER_LIMIT)
    }
}

impl ScopeConfig {
    /// A scope with no limited methods whose ceiling is the server limit
    #[must_use]
    pub const fn with_server_limit(server_limit: usize) -> Self {
        Self {
            limited_methods: MethodSet::new(),
            max_concurrent: if server_limit == 0 { 1 } else { server_limit },
        }
    }

    /// Create a scope config from its parts
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidMaxConcurrent`] if `max_concurrent` is 0.
    pub fn new(limited_methods: MethodSet, max_concurrent: usize) -> Result<Self> {
        if max_concurrent < 1 {
            return Err(ErrorKind::InvalidMaxConcurrent);
        }
        Ok(Self {
            limited_methods,
            max_concurrent,
        })
    }

    /// Record which methods the cap applies to
    pub fn set_limited_methods(&mut self, methods: MethodSet) {
        self.limited_methods = methods;
    }

    /// Set the concurrency ceiling
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidMaxConcurrent`] if `value` is below 1.
    pub fn set_max_concurrent(&mut self, value: i64) -> Result<()> {
        if value < 1 {
            return Err(ErrorKind::InvalidMaxConcurrent);
        }
        self.max_concurrent = usize::try_from(value).map_err(|_| ErrorKind::InvalidMaxConcurrent)?;
        Ok(())
    }

    /// Apply a `MaxConcurrentReqs <n>` directive found inside a section that
    /// limits `methods`.
    ///
    /// The directive takes the method list of its enclosing section, so both
    /// fields are set together.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidMaxConcurrent`] if `arg` is not a
    /// positive integer.
    pub fn apply_directive(&mut self, arg: &str, methods: MethodSet) -> Result<()> {
        let value = arg
            .trim()
            .parse::<i64>()
            .map_err(|_| ErrorKind::InvalidMaxConcurrent)?;
        self.set_max_concurrent(value)?;
        self.limited_methods = methods;
        Ok(())
    }

    /// The methods the cap applies to
    #[must_use]
    pub const fn limited_methods(&self) -> &MethodSet {
        &self.limited_methods
    }

    /// The concurrency ceiling, always at least 1
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Returns `true` if no method is limited, so every request is admitted
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.limited_methods.is_empty()
    }
}
