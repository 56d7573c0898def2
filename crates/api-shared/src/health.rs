use caregraph_core::{GraphError, GraphStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Process liveness response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Health checks shared by the REST server and the CLI.
///
/// [`check_health`](Self::check_health) reports process liveness only. The graph check runs the
/// store's liveness query and turns the outcome into a plain text message; it is the one place
/// where a store error is caught rather than propagated.
#[derive(Clone)]
pub struct HealthService {
    store: Arc<dyn GraphStore>,
}

impl HealthService {
    /// Creates a new `HealthService` over the given store.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Static liveness check that does not touch the store.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "CareGraph is alive".into(),
        }
    }

    /// Runs `RETURN 1`-style liveness against the graph store.
    ///
    /// # Returns
    /// One of:
    /// - `"<backend> connection OK."`
    /// - `"<backend> connection failed (no result)."` when the query returns no row
    /// - `"<backend> connection failed: <cause>"`
    pub async fn check_graph(&self) -> String {
        let backend = self.store.backend_name();
        match self.store.ping().await {
            Ok(()) => format!("{backend} connection OK."),
            Err(GraphError::EmptyLiveness) => {
                tracing::warn!("{} liveness query returned no result", backend);
                format!("{backend} connection failed (no result).")
            }
            Err(e) => {
                tracing::error!("{} health check error: {:?}", backend, e);
                format!("{backend} connection failed: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use caregraph_core::graph::{Edge, NodeRecord, Vertex};
    use caregraph_core::schema::NodeSchema;
    use caregraph_core::{GraphResult, MemoryGraphStore};

    /// Store whose liveness query fails in a configurable way. Nothing else is called.
    struct FailingStore {
        empty: bool,
    }

    #[async_trait]
    impl GraphStore for FailingStore {
        fn backend_name(&self) -> &'static str {
            "Neo4j"
        }

        async fn ping(&self) -> GraphResult<()> {
            if self.empty {
                Err(GraphError::EmptyLiveness)
            } else {
                Err(GraphError::InvalidInput("connection refused".into()))
            }
        }

        async fn upsert_vertex(&self, _: &'static NodeSchema, _: &Vertex) -> GraphResult<()> {
            unreachable!()
        }

        async fn create_edge(&self, _: &'static NodeSchema, _: &str, _: &Edge) -> GraphResult<i64> {
            unreachable!()
        }

        async fn update_edge(&self, _: &'static NodeSchema, _: &str, _: &Edge) -> GraphResult<()> {
            unreachable!()
        }

        async fn detach_other_targets(
            &self,
            _: &'static NodeSchema,
            _: &str,
            _: &Edge,
        ) -> GraphResult<usize> {
            unreachable!()
        }

        async fn fetch(&self, _: &'static NodeSchema, _: &str) -> GraphResult<Option<NodeRecord>> {
            unreachable!()
        }

        async fn fetch_all(&self, _: &'static NodeSchema) -> GraphResult<Vec<NodeRecord>> {
            unreachable!()
        }

        async fn exists(&self, _: &'static NodeSchema, _: &str) -> GraphResult<bool> {
            unreachable!()
        }

        async fn count_vertices(&self, _: &'static NodeSchema) -> GraphResult<usize> {
            unreachable!()
        }

        async fn count_edges(&self, _: &'static NodeSchema, _: &str) -> GraphResult<usize> {
            unreachable!()
        }

        async fn delete_vertex(&self, _: &'static NodeSchema, _: &str) -> GraphResult<bool> {
            unreachable!()
        }

        async fn delete_vertices(&self, _: &'static NodeSchema) -> GraphResult<usize> {
            unreachable!()
        }
    }

    #[test]
    fn static_check_reports_alive() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "CareGraph is alive");
    }

    #[tokio::test]
    async fn graph_check_succeeds_on_memory_store() {
        let service = HealthService::new(Arc::new(MemoryGraphStore::new()));
        assert_eq!(service.check_graph().await, "In-memory graph connection OK.");
    }

    #[tokio::test]
    async fn graph_check_reports_empty_result() {
        let service = HealthService::new(Arc::new(FailingStore { empty: true }));
        assert_eq!(
            service.check_graph().await,
            "Neo4j connection failed (no result)."
        );
    }

    #[tokio::test]
    async fn graph_check_includes_cause() {
        let service = HealthService::new(Arc::new(FailingStore { empty: false }));
        let message = service.check_graph().await;
        assert!(message.starts_with("Neo4j connection failed: "));
        assert!(message.contains("connection refused"));
    }
}
