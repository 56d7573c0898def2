use std::collections::BTreeMap;
use std::fmt;

/// A scalar stored on a node or an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

/// Property bag keyed by stored property name. Ordered so stored output is stable.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Inserts `value` under `key` when present. Absent values are not stored at all.
pub fn put_opt(map: &mut PropertyMap, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), PropertyValue::String(value.clone()));
    }
}

/// Reads an optional string property. Non-string values are rendered as text.
pub fn get_opt(map: &PropertyMap, key: &str) -> Option<String> {
    map.get(key).map(|value| match value {
        PropertyValue::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// A node: its id (stored under the label's id property) and its other properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub label: String,
    pub id: String,
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            properties: PropertyMap::new(),
        }
    }
}

/// An outgoing edge of a node. `id` is `None` until the edge has been created in the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: Option<i64>,
    pub edge_type: String,
    pub target_label: String,
    pub target_id: String,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(
        edge_type: impl Into<String>,
        target_label: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            edge_type: edge_type.into(),
            target_label: target_label.into(),
            target_id: target_id.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }
}

/// A node together with its outgoing edges, as loaded from or written to the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub vertex: Vertex,
    pub edges: Vec<Edge>,
}

impl NodeRecord {
    pub fn new(vertex: Vertex) -> Self {
        Self {
            vertex,
            edges: Vec::new(),
        }
    }

    /// Edges of one type, in ascending id order (unsaved edges last).
    pub fn edges_of<'a>(&'a self, edge_type: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        let mut edges: Vec<&Edge> = self
            .edges
            .iter()
            .filter(|edge| edge.edge_type == edge_type)
            .collect();
        edges.sort_by_key(|edge| edge.id.unwrap_or(i64::MAX));
        edges.into_iter()
    }
}
