//! # CareGraph Core
//!
//! Healthcare domain model persisted as nodes and relationships in a graph database.
//!
//! This crate contains the data layer only:
//! - Entity and relationship types ([`model`]) and their static registration ([`schema`])
//! - Graph store access over Neo4j or process memory ([`graph`])
//! - Generic per-entity repositories ([`repositories`])
//! - The startup sample data routine ([`seed`])
//!
//! **No API concerns**: HTTP servers, DTOs and health reporting belong in `api-rest` or
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod graph;
pub mod model;
pub mod repositories;
pub mod schema;
pub mod seed;

pub use config::{GraphBackend, GraphConfig};
pub use error::{GraphError, GraphResult};
pub use graph::{connect, GraphStore, MemoryGraphStore, Neo4jStore};
pub use repositories::{GraphStats, Repositories, Repository};
pub use seed::{seed, SampleRecords};
