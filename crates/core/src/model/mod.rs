//! Domain entities and the relationship records they own.
//!
//! Entities are plain data. They are converted to and from [`NodeRecord`]s by
//! [`GraphEntity`], and each outgoing relationship field holds records implementing
//! [`Relationship`]. Relationships refer to their target by id, so loading an entity never
//! pulls in the rest of the graph.

mod appointment;
mod clinical;
mod doctor;
mod patient;
mod relationships;

pub use appointment::{Alert, Appointment};
pub use clinical::{Diagnosis, Medication, Test, Treatment};
pub use doctor::{Doctor, Hospital};
pub use patient::Patient;
pub use relationships::{
    AdmittedTo, CaredForBy, Consulted, FollowUpTarget, FollowsUp, ForDiagnosis, ForTreatment,
    HasAppointment, HasDiagnosis, LeadsTo, Link, Ordered, Performed, PerformedAt, PracticesAt,
    Prescribed, ReceivesTreatment, ResultedIn, TakesMedication, UnderwentTest,
};

use crate::graph::{put_opt, Edge, NodeRecord, PropertyMap, Vertex};
use crate::schema::NodeSchema;
use crate::GraphResult;

/// An entity persisted as one labelled node plus its outgoing edges.
pub trait GraphEntity: Clone + Send + Sync + Sized + 'static {
    fn schema() -> &'static NodeSchema;

    fn entity_id(&self) -> &str;

    fn to_record(&self) -> NodeRecord;

    /// Rebuilds the entity from a stored node. Edges of one type are read in id order.
    fn from_record(record: NodeRecord) -> GraphResult<Self>;
}

/// A directed edge record owned by its source entity.
pub trait Relationship: Sized {
    /// Store generated id, `None` until the owning entity has been saved.
    fn edge_id(&self) -> Option<i64>;

    /// Label and id of the target node.
    fn target(&self) -> (&'static str, &str);

    fn properties(&self) -> PropertyMap {
        PropertyMap::new()
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self>;
}

pub(crate) fn vertex(schema: &NodeSchema, id: &str, fields: &[(&str, &Option<String>)]) -> Vertex {
    let mut vertex = Vertex::new(schema.label, id);
    for (key, value) in fields {
        put_opt(&mut vertex.properties, key, value);
    }
    vertex
}

fn to_edge<R: Relationship>(edge_type: &str, relationship: &R) -> Edge {
    let (target_label, target_id) = relationship.target();
    Edge::new(edge_type, target_label, target_id)
        .with_id(relationship.edge_id())
        .with_properties(relationship.properties())
}

pub(crate) fn push_many<R: Relationship>(record: &mut NodeRecord, edge_type: &str, items: &[R]) {
    record
        .edges
        .extend(items.iter().map(|item| to_edge(edge_type, item)));
}

pub(crate) fn push_one<R: Relationship>(
    record: &mut NodeRecord,
    edge_type: &str,
    item: &Option<R>,
) {
    if let Some(item) = item {
        record.edges.push(to_edge(edge_type, item));
    }
}

pub(crate) fn read_many<R: Relationship>(
    record: &NodeRecord,
    edge_type: &str,
) -> GraphResult<Vec<R>> {
    record.edges_of(edge_type).map(R::from_edge).collect()
}

/// Reads a single-valued relationship. When the store holds several edges of the type the
/// one with the lowest id is used.
pub(crate) fn read_one<R: Relationship>(
    record: &NodeRecord,
    edge_type: &str,
) -> GraphResult<Option<R>> {
    let mut edges = record.edges_of(edge_type);
    let first = edges.next().map(R::from_edge).transpose()?;
    let extra = edges.count();
    if extra > 0 {
        tracing::warn!(
            "{} '{}' holds {} {} edges, using the earliest",
            record.vertex.label,
            record.vertex.id,
            extra + 1,
            edge_type
        );
    }
    Ok(first)
}
