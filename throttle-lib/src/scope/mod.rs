//! Per-scope throttling policies.
//!
//! - [`ScopeConfig`]: the policy of one URL scope, i.e. which methods are
//!   limited and how many of them may be in flight at once
//! - [`ScopeConfigs`]: all scopes of a server, loaded from a TOML file and
//!   resolved by longest location prefix

mod config;
mod registry;

pub use config::{DEFAULT_SERVER_LIMIT, ScopeConfig};
pub use registry::{ScopeConfigs, THROTTLE_CONFIG_FILE};
