//! Constants used throughout the CareGraph core crate.
//!
//! Connection defaults and environment variable names live here so the binaries and the
//! configuration module agree on them.

/// Default Bolt URI of the graph database.
pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";

/// Default graph database user.
pub const DEFAULT_NEO4J_USERNAME: &str = "neo4j";

/// Default size of the driver connection pool.
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;

/// Default bind address of the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8080";

pub const ENV_STORE: &str = "CAREGRAPH_STORE";
pub const ENV_NEO4J_URI: &str = "NEO4J_URI";
pub const ENV_NEO4J_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_NEO4J_DATABASE: &str = "NEO4J_DATABASE";
pub const ENV_MAX_CONNECTIONS: &str = "NEO4J_MAX_CONNECTIONS";
pub const ENV_ENSURE_CONSTRAINTS: &str = "CAREGRAPH_ENSURE_CONSTRAINTS";
pub const ENV_REST_ADDR: &str = "CAREGRAPH_REST_ADDR";
