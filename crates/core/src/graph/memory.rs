use super::{Edge, GraphStore, NodeRecord, PropertyMap, Vertex};
use crate::schema::{self, NodeSchema};
use crate::{GraphError, GraphResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

type NodeKey = (&'static str, String);

#[derive(Debug)]
struct StoredEdge {
    id: i64,
    source: NodeKey,
    target: NodeKey,
    edge_type: &'static str,
    properties: PropertyMap,
}

impl StoredEdge {
    fn touches(&self, key: &NodeKey) -> bool {
        &self.source == key || &self.target == key
    }

    fn to_edge(&self) -> Edge {
        Edge::new(self.edge_type, self.target.0, self.target.1.clone())
            .with_id(Some(self.id))
            .with_properties(self.properties.clone())
    }
}

#[derive(Debug, Default)]
struct Internal {
    vertices: BTreeMap<NodeKey, PropertyMap>,
    edges: Vec<StoredEdge>,
    last_edge_id: i64,
}

impl Internal {
    fn record(&self, schema: &NodeSchema, key: &NodeKey, properties: &PropertyMap) -> NodeRecord {
        let declared = schema.edge_types();
        let mut record = NodeRecord::new(Vertex {
            label: schema.label.to_string(),
            id: key.1.clone(),
            properties: properties.clone(),
        });
        record.edges = self
            .edges
            .iter()
            .filter(|edge| &edge.source == key && declared.contains(&edge.edge_type))
            .map(StoredEdge::to_edge)
            .collect();
        record
    }
}

/// Graph store held entirely in process memory.
///
/// Edge ids are assigned from a counter, so stored edges are always in ascending id order.
/// The mutex is held only for the duration of a single call.
#[derive(Clone, Debug, Default)]
pub struct MemoryGraphStore {
    inner: Arc<Mutex<Internal>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> GraphResult<MutexGuard<'_, Internal>> {
        self.inner
            .lock()
            .map_err(|e| GraphError::Lock(e.to_string()))
    }
}

fn key(schema: &'static NodeSchema, id: &str) -> NodeKey {
    (schema.label, id.to_string())
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    fn backend_name(&self) -> &'static str {
        "In-memory graph"
    }

    async fn ping(&self) -> GraphResult<()> {
        self.lock().map(|_| ())
    }

    async fn upsert_vertex(&self, schema: &'static NodeSchema, vertex: &Vertex) -> GraphResult<()> {
        let mut internal = self.lock()?;
        internal
            .vertices
            .insert(key(schema, &vertex.id), vertex.properties.clone());
        Ok(())
    }

    async fn create_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<i64> {
        let declared = schema.relationship(&edge.edge_type).ok_or_else(|| {
            GraphError::UndeclaredRelationship {
                label: schema.label,
                edge_type: edge.edge_type.clone(),
            }
        })?;
        let target_schema = schema::lookup(&edge.target_label)?;

        let mut internal = self.lock()?;
        let source = key(schema, source_id);
        if !internal.vertices.contains_key(&source) {
            return Err(GraphError::InvalidInput(format!(
                "{} '{source_id}' does not exist",
                schema.label
            )));
        }
        let target = key(target_schema, &edge.target_id);
        if !internal.vertices.contains_key(&target) {
            return Err(GraphError::MissingTarget {
                label: schema.label,
                id: source_id.to_string(),
                edge_type: edge.edge_type.clone(),
                target_label: edge.target_label.clone(),
                target_id: edge.target_id.clone(),
            });
        }

        internal.last_edge_id += 1;
        let id = internal.last_edge_id;
        internal.edges.push(StoredEdge {
            id,
            source,
            target,
            edge_type: declared.edge_type,
            properties: edge.properties.clone(),
        });
        Ok(id)
    }

    async fn update_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<()> {
        let source = key(schema, source_id);
        let target = key(schema::lookup(&edge.target_label)?, &edge.target_id);
        let mut internal = self.lock()?;
        let stored = internal.edges.iter_mut().find(|stored| {
            Some(stored.id) == edge.id
                && stored.source == source
                && stored.target == target
                && stored.edge_type == edge.edge_type
        });
        match stored {
            Some(stored) => {
                stored.properties = edge.properties.clone();
                Ok(())
            }
            None => Err(GraphError::MissingEdge {
                label: schema.label,
                id: source_id.to_string(),
                edge_type: edge.edge_type.clone(),
                edge_id: edge.id.unwrap_or_default(),
                target_label: edge.target_label.clone(),
                target_id: edge.target_id.clone(),
            }),
        }
    }

    async fn detach_other_targets(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<usize> {
        let source = key(schema, source_id);
        let target = key(schema::lookup(&edge.target_label)?, &edge.target_id);
        let mut internal = self.lock()?;
        let before = internal.edges.len();
        internal.edges.retain(|stored| {
            stored.source != source || stored.edge_type != edge.edge_type || stored.target == target
        });
        Ok(before - internal.edges.len())
    }

    async fn fetch(
        &self,
        schema: &'static NodeSchema,
        id: &str,
    ) -> GraphResult<Option<NodeRecord>> {
        let internal = self.lock()?;
        let key = key(schema, id);
        Ok(internal
            .vertices
            .get(&key)
            .map(|properties| internal.record(schema, &key, properties)))
    }

    async fn fetch_all(&self, schema: &'static NodeSchema) -> GraphResult<Vec<NodeRecord>> {
        let internal = self.lock()?;
        Ok(internal
            .vertices
            .iter()
            .filter(|(key, _)| key.0 == schema.label)
            .map(|(key, properties)| internal.record(schema, key, properties))
            .collect())
    }

    async fn exists(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
        Ok(self.lock()?.vertices.contains_key(&key(schema, id)))
    }

    async fn count_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
        Ok(self
            .lock()?
            .vertices
            .keys()
            .filter(|key| key.0 == schema.label)
            .count())
    }

    async fn count_edges(
        &self,
        schema: &'static NodeSchema,
        edge_type: &str,
    ) -> GraphResult<usize> {
        Ok(self
            .lock()?
            .edges
            .iter()
            .filter(|edge| edge.source.0 == schema.label && edge.edge_type == edge_type)
            .count())
    }

    async fn delete_vertex(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
        let mut internal = self.lock()?;
        let key = key(schema, id);
        if internal.vertices.remove(&key).is_none() {
            return Ok(false);
        }
        internal.edges.retain(|edge| !edge.touches(&key));
        Ok(true)
    }

    async fn delete_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
        let mut internal = self.lock()?;
        let before = internal.vertices.len();
        internal.vertices.retain(|key, _| key.0 != schema.label);
        internal
            .edges
            .retain(|edge| edge.source.0 != schema.label && edge.target.0 != schema.label);
        Ok(before - internal.vertices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DIAGNOSIS, DIAGNOSIS_LABEL, PATIENT, TREATMENT, TREATMENT_LABEL};

    async fn store_with_nodes() -> MemoryGraphStore {
        let store = MemoryGraphStore::new();
        for (schema, id) in [(&PATIENT, "pat1"), (&DIAGNOSIS, "diag1"), (&TREATMENT, "treat1")] {
            store
                .upsert_vertex(schema, &Vertex::new(schema.label, id))
                .await
                .expect("upsert should succeed");
        }
        store
    }

    #[tokio::test]
    async fn upsert_replaces_properties() {
        let store = MemoryGraphStore::new();
        let mut vertex = Vertex::new(DIAGNOSIS_LABEL, "diag1");
        vertex.properties.insert("name".into(), "Hypertension".into());
        vertex.properties.insert("description".into(), "High blood pressure".into());
        store.upsert_vertex(&DIAGNOSIS, &vertex).await.unwrap();

        vertex.properties.remove("description");
        store.upsert_vertex(&DIAGNOSIS, &vertex).await.unwrap();

        let record = store.fetch(&DIAGNOSIS, "diag1").await.unwrap().unwrap();
        assert_eq!(record.vertex.properties.len(), 1);
        assert_eq!(store.count_vertices(&DIAGNOSIS).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn edges_get_increasing_ids() {
        let store = store_with_nodes().await;
        let first = store
            .create_edge(&PATIENT, "pat1", &Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag1"))
            .await
            .unwrap();
        let second = store
            .create_edge(
                &PATIENT,
                "pat1",
                &Edge::new("RECEIVES_TREATMENT", TREATMENT_LABEL, "treat1"),
            )
            .await
            .unwrap();
        assert!(second > first);

        let record = store.fetch(&PATIENT, "pat1").await.unwrap().unwrap();
        let ids: Vec<Option<i64>> = record.edges.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(first), Some(second)]);
        assert_eq!(store.count_edges(&PATIENT, "HAS_DIAGNOSIS").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_target_is_rejected() {
        let store = store_with_nodes().await;
        let err = store
            .create_edge(&PATIENT, "pat1", &Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingTarget { .. }));
        assert_eq!(store.count_edges(&PATIENT, "HAS_DIAGNOSIS").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_edge_overwrites_properties() {
        let store = store_with_nodes().await;
        let mut edge = Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag1");
        edge.properties.insert("diagnosedDate".into(), "2024-01-15".into());
        edge.id = Some(store.create_edge(&PATIENT, "pat1", &edge).await.unwrap());

        edge.properties.insert("diagnosedDate".into(), "2024-02-01".into());
        store.update_edge(&PATIENT, "pat1", &edge).await.unwrap();

        let record = store.fetch(&PATIENT, "pat1").await.unwrap().unwrap();
        assert_eq!(record.edges, vec![edge]);
    }

    #[tokio::test]
    async fn update_edge_requires_the_stored_edge() {
        let store = store_with_nodes().await;
        let mut edge = Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag1");
        edge.id = Some(store.create_edge(&PATIENT, "pat1", &edge).await.unwrap());

        let unknown = edge.clone().with_id(Some(99));
        let err = store.update_edge(&PATIENT, "pat1", &unknown).await.unwrap_err();
        assert!(matches!(err, GraphError::MissingEdge { edge_id: 99, .. }));

        let repointed = Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag2").with_id(edge.id);
        let err = store.update_edge(&PATIENT, "pat1", &repointed).await.unwrap_err();
        assert!(matches!(err, GraphError::MissingEdge { .. }));
    }

    #[tokio::test]
    async fn detach_other_targets_keeps_matching_edges() {
        let store = store_with_nodes().await;
        store
            .upsert_vertex(&DIAGNOSIS, &Vertex::new(DIAGNOSIS_LABEL, "diag2"))
            .await
            .unwrap();
        for target in ["diag1", "diag1", "diag2"] {
            let edge = Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, target);
            store.create_edge(&PATIENT, "pat1", &edge).await.unwrap();
        }
        store
            .create_edge(
                &PATIENT,
                "pat1",
                &Edge::new("RECEIVES_TREATMENT", TREATMENT_LABEL, "treat1"),
            )
            .await
            .unwrap();

        let keep = Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag2");
        assert_eq!(store.detach_other_targets(&PATIENT, "pat1", &keep).await.unwrap(), 2);

        let record = store.fetch(&PATIENT, "pat1").await.unwrap().unwrap();
        let targets: Vec<&str> = record.edges.iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(targets, vec!["diag2", "treat1"]);
    }

    #[tokio::test]
    async fn deleting_a_target_detaches_incoming_edges() {
        let store = store_with_nodes().await;
        store
            .create_edge(&PATIENT, "pat1", &Edge::new("HAS_DIAGNOSIS", DIAGNOSIS_LABEL, "diag1"))
            .await
            .unwrap();

        assert!(store.delete_vertex(&DIAGNOSIS, "diag1").await.unwrap());
        assert!(!store.delete_vertex(&DIAGNOSIS, "diag1").await.unwrap());

        let record = store.fetch(&PATIENT, "pat1").await.unwrap().unwrap();
        assert!(record.edges.is_empty());
    }

    #[tokio::test]
    async fn delete_vertices_only_touches_one_label() {
        let store = store_with_nodes().await;
        assert_eq!(store.delete_vertices(&TREATMENT).await.unwrap(), 1);
        assert_eq!(store.count_vertices(&TREATMENT).await.unwrap(), 0);
        assert!(store.exists(&PATIENT, "pat1").await.unwrap());
        assert!(store.fetch_all(&TREATMENT).await.unwrap().is_empty());
    }
}
