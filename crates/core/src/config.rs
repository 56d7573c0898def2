//! Graph store configuration.
//!
//! Configuration is resolved once at process startup and then passed to
//! [`connect`](crate::graph::connect). Request handling never reads environment variables.
//! The `*_from_env_value` helpers are pure so they can be tested without touching the
//! process environment.

use crate::constants::{
    DEFAULT_MAX_CONNECTIONS, DEFAULT_NEO4J_URI, DEFAULT_NEO4J_USERNAME, ENV_ENSURE_CONSTRAINTS,
    ENV_MAX_CONNECTIONS, ENV_NEO4J_DATABASE, ENV_NEO4J_PASSWORD, ENV_NEO4J_URI,
    ENV_NEO4J_USERNAME, ENV_STORE,
};
use crate::{GraphError, GraphResult};
use std::fmt;
use std::str::FromStr;

/// Which graph store implementation backs the repositories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphBackend {
    Neo4j,
    Memory,
}

impl FromStr for GraphBackend {
    type Err = GraphError;

    fn from_str(s: &str) -> GraphResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "neo4j" => Ok(GraphBackend::Neo4j),
            "memory" | "inmemory" | "in-memory" => Ok(GraphBackend::Memory),
            other => Err(GraphError::InvalidInput(format!(
                "unknown graph store '{other}' (expected 'neo4j' or 'memory')"
            ))),
        }
    }
}

impl fmt::Display for GraphBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphBackend::Neo4j => write!(f, "neo4j"),
            GraphBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Graph store configuration resolved at startup.
#[derive(Clone)]
pub struct GraphConfig {
    backend: GraphBackend,
    uri: String,
    username: String,
    password: String,
    database: Option<String>,
    max_connections: usize,
    ensure_constraints: bool,
}

impl GraphConfig {
    /// Create a new `GraphConfig`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidInput` if the Neo4j backend is selected and the URI,
    /// username or password is empty, or if `max_connections` is zero.
    pub fn new(
        backend: GraphBackend,
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: Option<String>,
        max_connections: usize,
        ensure_constraints: bool,
    ) -> GraphResult<Self> {
        let uri = uri.into();
        let username = username.into();
        let password = password.into();

        if backend == GraphBackend::Neo4j {
            if uri.trim().is_empty() {
                return Err(GraphError::InvalidInput("neo4j uri cannot be empty".into()));
            }
            if username.trim().is_empty() {
                return Err(GraphError::InvalidInput(
                    "neo4j username cannot be empty".into(),
                ));
            }
            if password.is_empty() {
                return Err(GraphError::InvalidInput(format!(
                    "{ENV_NEO4J_PASSWORD} must be set for the neo4j store"
                )));
            }
        }
        if max_connections == 0 {
            return Err(GraphError::InvalidInput(
                "max_connections must be at least 1".into(),
            ));
        }

        Ok(Self {
            backend,
            uri,
            username,
            password,
            database: database.filter(|db| !db.trim().is_empty()),
            max_connections,
            ensure_constraints,
        })
    }

    /// Configuration for the in-memory store.
    pub fn memory() -> Self {
        Self {
            backend: GraphBackend::Memory,
            uri: String::new(),
            username: String::new(),
            password: String::new(),
            database: None,
            max_connections: 1,
            ensure_constraints: false,
        }
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Intended to be called exactly once by a binary's `main`, after `.env` has been loaded.
    pub fn from_env() -> GraphResult<Self> {
        let env = |key: &str| std::env::var(key).ok();

        Self::new(
            backend_from_env_value(env(ENV_STORE))?,
            env(ENV_NEO4J_URI).unwrap_or_else(|| DEFAULT_NEO4J_URI.into()),
            env(ENV_NEO4J_USERNAME).unwrap_or_else(|| DEFAULT_NEO4J_USERNAME.into()),
            env(ENV_NEO4J_PASSWORD).unwrap_or_default(),
            env(ENV_NEO4J_DATABASE),
            max_connections_from_env_value(env(ENV_MAX_CONNECTIONS))?,
            flag_from_env_value(ENV_ENSURE_CONSTRAINTS, env(ENV_ENSURE_CONSTRAINTS), true)?,
        )
    }

    pub fn backend(&self) -> GraphBackend {
        self.backend
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn ensure_constraints(&self) -> bool {
        self.ensure_constraints
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("backend", &self.backend)
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("ensure_constraints", &self.ensure_constraints)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or blank, the Neo4j backend is used.
pub fn backend_from_env_value(value: Option<String>) -> GraphResult<GraphBackend> {
    non_blank(value)
        .map(|v| v.parse())
        .transpose()
        .map(|backend| backend.unwrap_or(GraphBackend::Neo4j))
}

/// Parse the connection pool size from an optional string value.
pub fn max_connections_from_env_value(value: Option<String>) -> GraphResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(v) => v.parse().map_err(|_| {
            GraphError::InvalidInput(format!("{ENV_MAX_CONNECTIONS} is not a number: {v}"))
        }),
    }
}

/// Parse a boolean flag, accepting `true/false`, `1/0` and `yes/no`.
pub fn flag_from_env_value(name: &str, value: Option<String>, default: bool) -> GraphResult<bool> {
    match non_blank(value).map(|v| v.to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(GraphError::InvalidInput(format!(
                "{name} must be true or false, got '{v}'"
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_defaults_to_neo4j() {
        assert_eq!(backend_from_env_value(None).unwrap(), GraphBackend::Neo4j);
        assert_eq!(
            backend_from_env_value(Some("  ".into())).unwrap(),
            GraphBackend::Neo4j
        );
        assert_eq!(
            backend_from_env_value(Some("Memory".into())).unwrap(),
            GraphBackend::Memory
        );
    }

    #[test]
    fn backend_rejects_unknown_names() {
        let err = backend_from_env_value(Some("sled".into())).unwrap_err();
        assert!(matches!(err, GraphError::InvalidInput(_)));
    }

    #[test]
    fn neo4j_backend_requires_password() {
        let err = GraphConfig::new(
            GraphBackend::Neo4j,
            DEFAULT_NEO4J_URI,
            DEFAULT_NEO4J_USERNAME,
            "",
            None,
            DEFAULT_MAX_CONNECTIONS,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains(ENV_NEO4J_PASSWORD));
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let cfg = GraphConfig::new(GraphBackend::Memory, "", "", "", None, 1, false)
            .expect("memory config should be valid");
        assert_eq!(cfg.backend(), GraphBackend::Memory);
        assert!(cfg.database().is_none());
    }

    #[test]
    fn blank_database_is_treated_as_default() {
        let cfg = GraphConfig::new(
            GraphBackend::Neo4j,
            DEFAULT_NEO4J_URI,
            "neo4j",
            "secret",
            Some(" ".into()),
            4,
            false,
        )
        .unwrap();
        assert_eq!(cfg.database(), None);
        assert_eq!(cfg.max_connections(), 4);
    }

    #[test]
    fn debug_output_redacts_password() {
        let cfg = GraphConfig::new(
            GraphBackend::Neo4j,
            DEFAULT_NEO4J_URI,
            "neo4j",
            "hunter2",
            None,
            4,
            true,
        )
        .unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn numeric_and_flag_values_are_parsed() {
        assert_eq!(max_connections_from_env_value(None).unwrap(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(max_connections_from_env_value(Some("8".into())).unwrap(), 8);
        assert!(max_connections_from_env_value(Some("eight".into())).is_err());

        assert!(flag_from_env_value("X", None, true).unwrap());
        assert!(!flag_from_env_value("X", Some("no".into()), true).unwrap());
        assert!(flag_from_env_value("X", Some("1".into()), false).unwrap());
        assert!(flag_from_env_value("X", Some("maybe".into()), false).is_err());
    }
}
