#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to connect to graph store: {0}")]
    Connect(neo4rs::Error),
    #[error("graph query failed: {0}")]
    Query(neo4rs::Error),
    #[error("failed to decode {owner} property '{key}': {source}")]
    Decode {
        owner: String,
        key: String,
        #[source]
        source: neo4rs::DeError,
    },
    #[error("{label} node is missing its id property '{key}'")]
    MissingId { label: &'static str, key: &'static str },
    #[error("{label} '{id}' cannot link {edge_type} to {target_label} '{target_id}': target does not exist")]
    MissingTarget {
        label: &'static str,
        id: String,
        edge_type: String,
        target_label: String,
        target_id: String,
    },
    #[error("{label} '{id}' has no stored {edge_type} relationship {edge_id} to {target_label} '{target_id}'")]
    MissingEdge {
        label: &'static str,
        id: String,
        edge_type: String,
        edge_id: i64,
        target_label: String,
        target_id: String,
    },
    #[error("{label} declares no property '{key}'")]
    UndeclaredProperty { label: &'static str, key: String },
    #[error("{label} declares no relationship {edge_type}")]
    UndeclaredRelationship { label: &'static str, edge_type: String },
    #[error("{label}.{edge_type} cannot target {target_label}")]
    UnexpectedTarget {
        label: &'static str,
        edge_type: String,
        target_label: String,
    },
    #[error("{label}.{edge_type} holds at most one relationship, found {count}")]
    CardinalityExceeded {
        label: &'static str,
        edge_type: &'static str,
        count: usize,
    },
    #[error("unknown node label '{0}'")]
    UnknownLabel(String),
    #[error("liveness query returned no result")]
    EmptyLiveness,
    #[error("graph store lock poisoned: {0}")]
    Lock(String),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
