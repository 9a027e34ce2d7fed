use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, str::FromStr};

use super::config::{DEFAULT_SERVER_LIMIT, ScopeConfig};
use crate::{ErrorKind, MethodSet, Result};

/// Default name of the scope configuration file
pub const THROTTLE_CONFIG_FILE: &str = "throttle.toml";

/// Scope configuration file as written on disk
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScopeFile {
    #[serde(default = "default_server_limit")]
    server_limit: usize,

    #[serde(default)]
    scopes: BTreeMap<String, ScopeEntry>,
}

/// One `[scopes."<location>"]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScopeEntry {
    #[serde(default)]
    methods: MethodSet,

    /// Kept as a raw value so that a non-integer gets the same diagnostic
    /// as an out-of-range integer
    max_concurrent_reqs: Option<toml::Value>,
}

const fn default_server_limit() -> usize {
    DEFAULT_SERVER_LIMIT
}

impl ScopeEntry {
    fn into_config(self, server_limit: usize) -> Result<ScopeConfig> {
        let mut config = ScopeConfig::with_server_limit(server_limit);
        config.set_limited_methods(self.methods);
        match self.max_concurrent_reqs {
            None => {}
            Some(toml::Value::Integer(value)) => config.set_max_concurrent(value)?,
            Some(toml::Value::String(arg)) => config.apply_directive(&arg, self.methods)?,
            Some(_) => return Err(ErrorKind::InvalidMaxConcurrent),
        }
        Ok(config)
    }
}

/// Registry of per-scope throttling policies, keyed by URL location
///
/// A request is governed by the scope with the longest location that is a
/// prefix of its path. Scopes never inherit from each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeConfigs {
    server_limit: usize,
    scopes: BTreeMap<String, ScopeConfig>,
}

impl Default for ScopeConfigs {
    fn default() -> Self {
        Self {
            server_limit: DEFAULT_SERVER_LIMIT,
            scopes: BTreeMap::new(),
        }
    }
}

impl ScopeConfigs {
    /// Create an empty registry for a server running at most `server_limit`
    /// workers
    ///
    /// # Errors
    ///
    /// Fails if `server_limit` is 0.
    pub fn new(server_limit: usize) -> Result<Self> {
        if server_limit == 0 {
            return Err(ErrorKind::InvalidServerLimit(server_limit));
        }
        Ok(Self {
            server_limit,
            scopes: BTreeMap::new(),
        })
    }

    /// Load a registry from a TOML file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds an invalid configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| (path.to_path_buf(), e))?;
        contents.parse()
    }

    /// Maximum number of workers, the default ceiling of every scope
    #[must_use]
    pub const fn server_limit(&self) -> usize {
        self.server_limit
    }

    /// A fresh, inert scope config for this server
    #[must_use]
    pub const fn new_scope(&self) -> ScopeConfig {
        ScopeConfig::with_server_limit(self.server_limit)
    }

    /// Register the policy of a location, replacing any previous one
    ///
    /// # Errors
    ///
    /// Fails if `location` does not start with `/`.
    pub fn insert(&mut self, location: &str, config: ScopeConfig) -> Result<Option<ScopeConfig>> {
        if !location.starts_with('/') {
            return Err(ErrorKind::InvalidScopeLocation(location.to_string()));
        }
        Ok(self.scopes.insert(location.to_string(), config))
    }

    /// Find the scope governing `path`
    ///
    /// Returns the location and the policy of the most specific match.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<(&str, &ScopeConfig)> {
        self.scopes
            .iter()
            .filter(|(location, _)| path.starts_with(location.as_str()))
            .max_by_key(|(location, _)| location.len())
            .map(|(location, config)| (location.as_str(), config))
    }

    /// Look up the policy of an exact location
    #[must_use]
    pub fn get(&self, location: &str) -> Option<&ScopeConfig> {
        self.scopes.get(location)
    }

    /// Iterate over all scopes in location order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeConfig)> {
        self.scopes
            .iter()
            .map(|(location, config)| (location.as_str(), config))
    }

    /// Number of configured scopes
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if no scope is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl FromStr for ScopeConfigs {
    type Err = ErrorKind;

    fn from_str(contents: &str) -> Result<Self> {
        let file: ScopeFile = toml::from_str(contents)?;
        let mut registry = Self::new(file.server_limit)?;
        for (location, entry) in file.scopes {
            let config = entry.into_config(registry.server_limit)?;
            registry.insert(&location, config)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MethodId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const CONFIG: &str = r#"
server_limit = 150

[scopes."/"]
methods = ["POST"]
max_concurrent_reqs = 40

[scopes."/api"]
methods = ["GET", "POST"]
max_concurrent_reqs = 2

[scopes."/api/bulk"]
methods = "PUT"
max_concurrent_reqs = "1"

[scopes."/static"]
"#;

    #[test]
    fn test_parse() {
        let registry = ScopeConfigs::from_str(CONFIG).unwrap();
        assert_eq!(registry.server_limit(), 150);
        assert_eq!(registry.len(), 4);

        let api = registry.get("/api").unwrap();
        assert_eq!(api.max_concurrent(), 2);
        assert!(api.limited_methods().contains(MethodId::Get));
        assert!(api.limited_methods().contains(MethodId::Post));
        assert!(!api.limited_methods().contains(MethodId::Delete));

        let bulk = registry.get("/api/bulk").unwrap();
        assert_eq!(bulk.max_concurrent(), 1);
        assert_eq!(bulk.limited_methods().to_string(), "PUT");

        let static_files = registry.get("/static").unwrap();
        assert_eq!(static_files.max_concurrent(), 150);
        assert!(static_files.is_inert());
    }

    #[rstest]
    #[case("/api/bulk/upload", Some("/api/bulk"))]
    #[case("/api/x", Some("/api"))]
    #[case("/apix", Some("/api"))]
    #[case("/static/logo.png", Some("/static"))]
    #[case("/index.html", Some("/"))]
    fn test_resolve_longest_prefix(#[case] path: &str, #[case] location: Option<&str>) {
        let registry = ScopeConfigs::from_str(CONFIG).unwrap();
        assert_eq!(registry.resolve(path).map(|(l, _)| l), location);
    }

    #[test]
    fn test_child_scope_does_not_inherit() {
        let registry = ScopeConfigs::from_str(CONFIG).unwrap();
        let (_, bulk) = registry.resolve("/api/bulk").unwrap();
        // `/api` limits GET, but `/api/bulk` only names PUT
        assert!(!bulk.limited_methods().contains(MethodId::Get));
    }

    #[test]
    fn test_resolve_without_root_scope() {
        let mut registry = ScopeConfigs::default();
        registry.insert("/api", registry.new_scope()).unwrap();
        assert!(registry.resolve("/index.html").is_none());
    }

    #[test]
    fn test_defaults() {
        let registry = ScopeConfigs::from_str("").unwrap();
        assert_eq!(registry.server_limit(), DEFAULT_SERVER_LIMIT);
        assert!(registry.is_empty());
    }

    #[rstest]
    #[case("max_concurrent_reqs = 0")]
    #[case("max_concurrent_reqs = -3")]
    #[case(r#"max_concurrent_reqs = "many""#)]
    #[case("max_concurrent_reqs = 2.5")]
    fn test_invalid_max_concurrent(#[case] entry: &str) {
        let contents = format!("[scopes.\"/api\"]\nmethods = [\"GET\"]\n{entry}\n");
        let err = ScopeConfigs::from_str(&contents).unwrap_err();
        assert_eq!(err, ErrorKind::InvalidMaxConcurrent);
        assert_eq!(
            err.to_string(),
            "MaxConcurrentReqs must be an integer greater than 0"
        );
    }

    #[test]
    fn test_invalid_location() {
        let contents = "[scopes.api]\nmax_concurrent_reqs = 1\n";
        assert_eq!(
            ScopeConfigs::from_str(contents),
            Err(ErrorKind::InvalidScopeLocation("api".into()))
        );
    }

    #[test]
    fn test_invalid_server_limit() {
        assert_eq!(
            ScopeConfigs::from_str("server_limit = 0"),
            Err(ErrorKind::InvalidServerLimit(0))
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let contents = "[scopes.\"/api\"]\nmax_clients = 3\n";
        assert!(matches!(
            ScopeConfigs::from_str(contents),
            Err(ErrorKind::ConfigParse(_))
        ));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let contents = "[scopes.\"/api\"]\nmethods = [\"FETCH\"]\nmax_concurrent_reqs = 3\n";
        let err = ScopeConfigs::from_str(contents).unwrap_err();
        assert!(err.to_string().contains("Unknown method `FETCH`"));
    }

    #[test]
    fn test_load_fixture() {
        let path = test_utils::fixtures_path!().join("throttle.toml");
        let registry = ScopeConfigs::load_from_file(&path).unwrap();
        assert_eq!(registry.server_limit(), 150);
        assert_eq!(
            registry.iter().map(|(location, _)| location).collect::<Vec<_>>(),
            vec!["/", "/api", "/api/reports", "/static"]
        );
        let (location, root) = registry.resolve("/upload").unwrap();
        assert_eq!(location, "/");
        assert_eq!(root.max_concurrent(), 40);
    }

    #[test]
    fn test_serialize_effective_config() {
        let registry = ScopeConfigs::from_str(
            "[scopes.\"/api\"]\nmethods = \"POST GET\"\nmax_concurrent_reqs = \" 2 \"\n",
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&registry).unwrap(),
            serde_json::json!({
                "server_limit": 256,
                "scopes": {
                    "/api": { "methods": ["GET", "POST"], "max_concurrent_reqs": 2 }
                }
            })
        );
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("/nonexistent/throttle.toml");
        assert!(matches!(
            ScopeConfigs::load_from_file(path),
            Err(ErrorKind::IoError(Some(_), _))
        ));
    }
}
