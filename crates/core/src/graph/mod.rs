//! Graph store access.
//!
//! [`GraphStore`] is the seam between the repositories and a concrete database. Two
//! implementations exist: [`Neo4jStore`] talks Bolt to a Neo4j server and
//! [`MemoryGraphStore`] keeps everything in process memory with the same semantics.

mod memory;
mod neo4j;
mod record;

pub use memory::MemoryGraphStore;
pub use neo4j::Neo4jStore;
pub use record::{get_opt, put_opt, Edge, NodeRecord, PropertyMap, PropertyValue, Vertex};

use crate::config::{GraphBackend, GraphConfig};
use crate::schema::NodeSchema;
use crate::GraphResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage operations needed by the repositories.
///
/// Labels and edge types are always taken from a registered [`NodeSchema`], never from
/// free text, so implementations may splice them into query text.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Human readable name used in health messages.
    fn backend_name(&self) -> &'static str;

    /// Runs the trivial liveness query.
    ///
    /// Returns `GraphError::EmptyLiveness` when the store answers without a result.
    async fn ping(&self) -> GraphResult<()>;

    /// Creates id uniqueness constraints for the given labels where the backend supports them.
    async fn ensure_constraints(&self, _schemas: &[&'static NodeSchema]) -> GraphResult<()> {
        Ok(())
    }

    /// Creates the node or replaces all of its properties.
    async fn upsert_vertex(&self, schema: &'static NodeSchema, vertex: &Vertex) -> GraphResult<()>;

    /// Creates one outgoing edge from an existing node and returns its generated id.
    ///
    /// Fails with `GraphError::MissingTarget` when the target node does not exist.
    async fn create_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<i64>;

    /// Replaces the properties of a persisted edge.
    ///
    /// The edge is matched by its id, its source, its type and its target. Fails with
    /// `GraphError::MissingEdge` when no such edge is stored.
    async fn update_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<()>;

    /// Deletes the outgoing `edge.edge_type` edges of the source node that point anywhere
    /// other than `edge`'s target. Returns the number of edges removed.
    async fn detach_other_targets(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<usize>;

    /// Loads a node with its outgoing edges of declared types, ordered by edge id.
    async fn fetch(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<Option<NodeRecord>>;

    /// Loads every node of a label, ordered by id.
    async fn fetch_all(&self, schema: &'static NodeSchema) -> GraphResult<Vec<NodeRecord>>;

    async fn exists(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool>;

    async fn count_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize>;

    /// Counts edges of `edge_type` leaving nodes of `schema`'s label.
    async fn count_edges(&self, schema: &'static NodeSchema, edge_type: &str)
        -> GraphResult<usize>;

    /// Deletes a node and every edge touching it. Returns whether the node existed.
    async fn delete_vertex(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool>;

    /// Deletes every node of a label with their edges. Returns the number of nodes removed.
    async fn delete_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize>;
}

/// Opens the store selected by `cfg`.
///
/// For Neo4j this establishes the connection pool and, when enabled, creates the id
/// uniqueness constraints for every registered label.
pub async fn connect(cfg: &GraphConfig) -> GraphResult<Arc<dyn GraphStore>> {
    match cfg.backend() {
        GraphBackend::Memory => {
            tracing::info!("-- Using in-memory graph store");
            Ok(Arc::new(MemoryGraphStore::new()))
        }
        GraphBackend::Neo4j => {
            let store = Neo4jStore::connect(cfg).await?;
            tracing::info!("-- Connected to Neo4j at {}", cfg.uri());
            if cfg.ensure_constraints() {
                store.ensure_constraints(&crate::schema::ALL).await?;
            }
            Ok(Arc::new(store))
        }
    }
}
