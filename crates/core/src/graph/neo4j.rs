use super::{Edge, GraphStore, NodeRecord, PropertyMap, PropertyValue, Vertex};
use crate::config::GraphConfig;
use crate::schema::{self, NodeSchema, RelationshipSchema};
use crate::{GraphError, GraphResult};
use async_trait::async_trait;
use neo4rs::{
    query, BoltMap, BoltString, BoltType, ConfigBuilder, DeError, Graph, Node, Query, Relation,
    Row,
};
use std::collections::HashMap;

/// Graph store backed by a Neo4j server over Bolt.
///
/// Every operation is a parameterized Cypher statement. Labels, id properties and edge types
/// come from the static schema table and are the only parts spliced into query text.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub async fn connect(cfg: &GraphConfig) -> GraphResult<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(cfg.uri())
            .user(cfg.username())
            .password(cfg.password())
            .max_connections(cfg.max_connections());
        if let Some(db) = cfg.database() {
            builder = builder.db(db);
        }
        let config = builder.build().map_err(GraphError::Connect)?;
        let graph = Graph::connect(config).await.map_err(GraphError::Connect)?;
        Ok(Self { graph })
    }

    async fn rows(&self, q: Query) -> GraphResult<Vec<Row>> {
        let mut stream = self.graph.execute(q).await.map_err(GraphError::Query)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(GraphError::Query)? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn single_count(&self, q: Query, owner: &str, column: &str) -> GraphResult<usize> {
        let rows = self.rows(q).await?;
        match rows.first() {
            Some(row) => {
                let count: i64 = row.get(column).map_err(|e| decode(owner, column, e))?;
                Ok(usize::try_from(count).unwrap_or(0))
            }
            None => Ok(0),
        }
    }

    async fn edges(
        &self,
        schema: &'static NodeSchema,
        id: Option<&str>,
    ) -> GraphResult<Vec<(String, Edge)>> {
        let cypher = edges_cypher(schema, id.is_some());
        let mut q = query(&cypher).param("types", edge_type_names(schema));
        if let Some(id) = id {
            q = q.param("id", id);
        }

        let mut edges = Vec::new();
        for row in self.rows(q).await? {
            let source: String = row
                .get("source")
                .map_err(|e| decode(schema.label, "source", e))?;
            let relation: Relation = row.get("r").map_err(|e| decode(schema.label, "r", e))?;
            let target: Node = row.get("t").map_err(|e| decode(schema.label, "t", e))?;
            edges.push((source, edge_from_row(&relation, &target)?));
        }
        Ok(edges)
    }
}

fn decode(owner: &str, key: &str, source: DeError) -> GraphError {
    GraphError::Decode {
        owner: owner.to_string(),
        key: key.to_string(),
        source,
    }
}

fn edge_type_names(schema: &NodeSchema) -> Vec<String> {
    schema
        .edge_types()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn declared(
    schema: &'static NodeSchema,
    edge_type: &str,
) -> GraphResult<&'static RelationshipSchema> {
    schema
        .relationship(edge_type)
        .ok_or_else(|| GraphError::UndeclaredRelationship {
            label: schema.label,
            edge_type: edge_type.to_string(),
        })
}

/// `(n:Label {idField: $param})`
fn node_pattern(var: &str, schema: &NodeSchema, param: &str) -> String {
    format!("({var}:{} {{{}: ${param}}})", schema.label, schema.id_field)
}

fn constraint_cypher(schema: &NodeSchema) -> String {
    format!(
        "CREATE CONSTRAINT caregraph_{name}_id IF NOT EXISTS \
         FOR (n:{label}) REQUIRE n.{id_field} IS UNIQUE",
        name = schema.label.to_lowercase(),
        label = schema.label,
        id_field = schema.id_field,
    )
}

fn upsert_cypher(schema: &NodeSchema) -> String {
    format!("MERGE {} SET n = $props", node_pattern("n", schema, "id"))
}

fn create_edge_cypher(
    schema: &NodeSchema,
    relationship: &RelationshipSchema,
    target: &NodeSchema,
) -> String {
    format!(
        "MATCH {source} MATCH {target} \
         CREATE (s)-[r:{edge_type}]->(t) SET r = $props RETURN id(r) AS id",
        source = node_pattern("s", schema, "source"),
        target = node_pattern("t", target, "target"),
        edge_type = relationship.edge_type,
    )
}

fn update_edge_cypher(
    schema: &NodeSchema,
    relationship: &RelationshipSchema,
    target: &NodeSchema,
) -> String {
    format!(
        "MATCH {source}-[r:{edge_type}]->{target} WHERE id(r) = $edge_id \
         SET r = $props RETURN id(r) AS id",
        source = node_pattern("s", schema, "source"),
        target = node_pattern("t", target, "target"),
        edge_type = relationship.edge_type,
    )
}

fn detach_other_targets_cypher(
    schema: &NodeSchema,
    relationship: &RelationshipSchema,
    target: &NodeSchema,
) -> String {
    format!(
        "MATCH {source}-[r:{edge_type}]->(t) \
         WHERE NOT (t:{target_label} AND t.{target_id_field} = $target) \
         DELETE r RETURN count(*) AS deleted",
        source = node_pattern("s", schema, "source"),
        edge_type = relationship.edge_type,
        target_label = target.label,
        target_id_field = target.id_field,
    )
}

/// Outgoing edges of declared types, for one node when `by_id` is set or for every node of
/// the label otherwise.
fn edges_cypher(schema: &NodeSchema, by_id: bool) -> String {
    let source = if by_id {
        node_pattern("n", schema, "id")
    } else {
        format!("(n:{})", schema.label)
    };
    format!(
        "MATCH {source}-[r]->(t) WHERE type(r) IN $types \
         RETURN n.{id_field} AS source, r, t ORDER BY id(r)",
        id_field = schema.id_field,
    )
}

fn bolt_value(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::String(s) => BoltType::from(s.clone()),
        PropertyValue::Integer(i) => BoltType::from(*i),
        PropertyValue::Boolean(b) => BoltType::from(*b),
    }
}

fn bolt_map(properties: &PropertyMap) -> BoltMap {
    let mut map = BoltMap::new();
    for (key, value) in properties {
        map.put(BoltString::from(key.as_str()), bolt_value(value));
    }
    map
}

/// Uniform read access to node and relationship properties.
trait StoredProperties {
    fn property_keys(&self) -> Vec<&str>;
    fn string(&self, key: &str) -> Result<String, DeError>;
    fn integer(&self, key: &str) -> Result<i64, DeError>;
    fn boolean(&self, key: &str) -> Result<bool, DeError>;
}

impl StoredProperties for Node {
    fn property_keys(&self) -> Vec<&str> {
        self.keys()
    }
    fn string(&self, key: &str) -> Result<String, DeError> {
        self.get(key)
    }
    fn integer(&self, key: &str) -> Result<i64, DeError> {
        self.get(key)
    }
    fn boolean(&self, key: &str) -> Result<bool, DeError> {
        self.get(key)
    }
}

impl StoredProperties for Relation {
    fn property_keys(&self) -> Vec<&str> {
        self.keys()
    }
    fn string(&self, key: &str) -> Result<String, DeError> {
        self.get(key)
    }
    fn integer(&self, key: &str) -> Result<i64, DeError> {
        self.get(key)
    }
    fn boolean(&self, key: &str) -> Result<bool, DeError> {
        self.get(key)
    }
}

/// Reads every property except `skip`. Strings are tried first, then integers, then booleans.
fn read_properties(
    owner: &str,
    source: &impl StoredProperties,
    skip: Option<&str>,
) -> GraphResult<PropertyMap> {
    let mut properties = PropertyMap::new();
    for key in source.property_keys() {
        if Some(key) == skip {
            continue;
        }
        let value = if let Ok(s) = source.string(key) {
            PropertyValue::String(s)
        } else if let Ok(i) = source.integer(key) {
            PropertyValue::Integer(i)
        } else {
            source
                .boolean(key)
                .map(PropertyValue::Boolean)
                .map_err(|e| decode(owner, key, e))?
        };
        properties.insert(key.to_string(), value);
    }
    Ok(properties)
}

fn node_id(schema: &'static NodeSchema, node: &Node) -> GraphResult<String> {
    if !node.keys().contains(&schema.id_field) {
        return Err(GraphError::MissingId {
            label: schema.label,
            key: schema.id_field,
        });
    }
    node.get(schema.id_field)
        .map_err(|e| decode(schema.label, schema.id_field, e))
}

fn vertex_from_node(schema: &'static NodeSchema, node: &Node) -> GraphResult<Vertex> {
    Ok(Vertex {
        label: schema.label.to_string(),
        id: node_id(schema, node)?,
        properties: read_properties(schema.label, node, Some(schema.id_field))?,
    })
}

fn edge_from_row(relation: &Relation, target: &Node) -> GraphResult<Edge> {
    let target_schema = target
        .labels()
        .into_iter()
        .find_map(|label| schema::lookup(label).ok())
        .ok_or_else(|| GraphError::UnknownLabel(target.labels().join(":")))?;
    let properties = read_properties(relation.typ(), relation, None)?;
    Ok(
        Edge::new(relation.typ(), target_schema.label, node_id(target_schema, target)?)
            .with_id(Some(relation.id()))
            .with_properties(properties),
    )
}

#[async_trait]
impl GraphStore for Neo4jStore {
    fn backend_name(&self) -> &'static str {
        "Neo4j"
    }

    async fn ping(&self) -> GraphResult<()> {
        let rows = self.rows(query("RETURN 1 AS result")).await?;
        let row = rows.first().ok_or(GraphError::EmptyLiveness)?;
        let _: i64 = row
            .get("result")
            .map_err(|e| decode("liveness", "result", e))?;
        Ok(())
    }

    async fn ensure_constraints(&self, schemas: &[&'static NodeSchema]) -> GraphResult<()> {
        for schema in schemas {
            self.graph
                .run(query(&constraint_cypher(schema)))
                .await
                .map_err(GraphError::Query)?;
            tracing::debug!("ensured uniqueness of {}.{}", schema.label, schema.id_field);
        }
        Ok(())
    }

    async fn upsert_vertex(&self, schema: &'static NodeSchema, vertex: &Vertex) -> GraphResult<()> {
        let mut properties = bolt_map(&vertex.properties);
        properties.put(
            BoltString::from(schema.id_field),
            BoltType::from(vertex.id.clone()),
        );
        self.graph
            .run(
                query(&upsert_cypher(schema))
                    .param("id", vertex.id.as_str())
                    .param("props", BoltType::Map(properties)),
            )
            .await
            .map_err(GraphError::Query)
    }

    async fn create_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<i64> {
        let relationship = declared(schema, &edge.edge_type)?;
        let target_schema = schema::lookup(&edge.target_label)?;
        let rows = self
            .rows(
                query(&create_edge_cypher(schema, relationship, target_schema))
                    .param("source", source_id)
                    .param("target", edge.target_id.as_str())
                    .param("props", BoltType::Map(bolt_map(&edge.properties))),
            )
            .await?;

        if let Some(row) = rows.first() {
            return row
                .get("id")
                .map_err(|e| decode(relationship.edge_type, "id", e));
        }
        if !self.exists(schema, source_id).await? {
            return Err(GraphError::InvalidInput(format!(
                "{} '{source_id}' does not exist",
                schema.label
            )));
        }
        Err(GraphError::MissingTarget {
            label: schema.label,
            id: source_id.to_string(),
            edge_type: edge.edge_type.clone(),
            target_label: edge.target_label.clone(),
            target_id: edge.target_id.clone(),
        })
    }

    async fn update_edge(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<()> {
        let relationship = declared(schema, &edge.edge_type)?;
        let target_schema = schema::lookup(&edge.target_label)?;
        let missing = || GraphError::MissingEdge {
            label: schema.label,
            id: source_id.to_string(),
            edge_type: edge.edge_type.clone(),
            edge_id: edge.id.unwrap_or_default(),
            target_label: edge.target_label.clone(),
            target_id: edge.target_id.clone(),
        };
        let edge_id = edge.id.ok_or_else(missing)?;
        let rows = self
            .rows(
                query(&update_edge_cypher(schema, relationship, target_schema))
                    .param("source", source_id)
                    .param("target", edge.target_id.as_str())
                    .param("edge_id", edge_id)
                    .param("props", BoltType::Map(bolt_map(&edge.properties))),
            )
            .await?;
        if rows.is_empty() {
            return Err(missing());
        }
        Ok(())
    }

    async fn detach_other_targets(
        &self,
        schema: &'static NodeSchema,
        source_id: &str,
        edge: &Edge,
    ) -> GraphResult<usize> {
        let relationship = declared(schema, &edge.edge_type)?;
        let target_schema = schema::lookup(&edge.target_label)?;
        self.single_count(
            query(&detach_other_targets_cypher(schema, relationship, target_schema))
                .param("source", source_id)
                .param("target", edge.target_id.as_str()),
            relationship.edge_type,
            "deleted",
        )
        .await
    }

    async fn fetch(
        &self,
        schema: &'static NodeSchema,
        id: &str,
    ) -> GraphResult<Option<NodeRecord>> {
        let cypher = format!("MATCH {} RETURN n", node_pattern("n", schema, "id"));
        let rows = self.rows(query(&cypher).param("id", id)).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let node: Node = row.get("n").map_err(|e| decode(schema.label, "n", e))?;

        let mut record = NodeRecord::new(vertex_from_node(schema, &node)?);
        record.edges = self
            .edges(schema, Some(id))
            .await?
            .into_iter()
            .map(|(_, edge)| edge)
            .collect();
        Ok(Some(record))
    }

    async fn fetch_all(&self, schema: &'static NodeSchema) -> GraphResult<Vec<NodeRecord>> {
        let cypher = format!(
            "MATCH (n:{label}) RETURN n ORDER BY n.{id_field}",
            label = schema.label,
            id_field = schema.id_field,
        );
        let mut by_source: HashMap<String, Vec<Edge>> = HashMap::new();
        for (source, edge) in self.edges(schema, None).await? {
            by_source.entry(source).or_default().push(edge);
        }

        let mut records = Vec::new();
        for row in self.rows(query(&cypher)).await? {
            let node: Node = row.get("n").map_err(|e| decode(schema.label, "n", e))?;
            let mut record = NodeRecord::new(vertex_from_node(schema, &node)?);
            record.edges = by_source.remove(&record.vertex.id).unwrap_or_default();
            records.push(record);
        }
        Ok(records)
    }

    async fn exists(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
        let cypher = format!(
            "MATCH {} RETURN count(n) AS count",
            node_pattern("n", schema, "id")
        );
        let count = self
            .single_count(query(&cypher).param("id", id), schema.label, "count")
            .await?;
        Ok(count > 0)
    }

    async fn count_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
        let cypher = format!("MATCH (n:{}) RETURN count(n) AS count", schema.label);
        self.single_count(query(&cypher), schema.label, "count")
            .await
    }

    async fn count_edges(
        &self,
        schema: &'static NodeSchema,
        edge_type: &str,
    ) -> GraphResult<usize> {
        let relationship = declared(schema, edge_type)?;
        let cypher = format!(
            "MATCH (:{label})-[r:{edge_type}]->() RETURN count(r) AS count",
            label = schema.label,
            edge_type = relationship.edge_type,
        );
        self.single_count(query(&cypher), relationship.edge_type, "count")
            .await
    }

    async fn delete_vertex(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
        let cypher = format!(
            "MATCH {} DETACH DELETE n RETURN count(n) AS deleted",
            node_pattern("n", schema, "id")
        );
        let deleted = self
            .single_count(query(&cypher).param("id", id), schema.label, "deleted")
            .await?;
        Ok(deleted > 0)
    }

    async fn delete_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
        let cypher = format!(
            "MATCH (n:{}) DETACH DELETE n RETURN count(n) AS deleted",
            schema.label
        );
        self.single_count(query(&cypher), schema.label, "deleted")
            .await
    }
}
