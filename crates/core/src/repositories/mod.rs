//! Repository access for every entity type.
//!
//! Each entity gets a type alias over the generic [`Repository`], and [`Repositories`]
//! bundles all of them around one shared store handle.

mod repository;

pub use repository::Repository;

use crate::graph::GraphStore;
use crate::model::{
    Alert, Appointment, Diagnosis, Doctor, Hospital, Medication, Patient, Test, Treatment,
};
use crate::schema;
use crate::GraphResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type PatientRepository = Repository<Patient>;
pub type DoctorRepository = Repository<Doctor>;
pub type HospitalRepository = Repository<Hospital>;
pub type AppointmentRepository = Repository<Appointment>;
pub type DiagnosisRepository = Repository<Diagnosis>;
pub type TreatmentRepository = Repository<Treatment>;
pub type MedicationRepository = Repository<Medication>;
pub type TestRepository = Repository<Test>;
pub type AlertRepository = Repository<Alert>;

/// Node and edge counts across the whole graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Nodes per label.
    pub nodes: BTreeMap<String, usize>,
    /// Edges per declared relationship, keyed `Label.EDGE_TYPE`.
    pub edges: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn total_nodes(&self) -> usize {
        self.nodes.values().sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges.values().sum()
    }
}

#[derive(Clone)]
pub struct Repositories {
    store: Arc<dyn GraphStore>,
    pub patients: PatientRepository,
    pub doctors: DoctorRepository,
    pub hospitals: HospitalRepository,
    pub appointments: AppointmentRepository,
    pub diagnoses: DiagnosisRepository,
    pub treatments: TreatmentRepository,
    pub medications: MedicationRepository,
    pub tests: TestRepository,
    pub alerts: AlertRepository,
}

impl Repositories {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            patients: Repository::new(store.clone()),
            doctors: Repository::new(store.clone()),
            hospitals: Repository::new(store.clone()),
            appointments: Repository::new(store.clone()),
            diagnoses: Repository::new(store.clone()),
            treatments: Repository::new(store.clone()),
            medications: Repository::new(store.clone()),
            tests: Repository::new(store.clone()),
            alerts: Repository::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Counts nodes per label and edges per declared relationship.
    pub async fn stats(&self) -> GraphResult<GraphStats> {
        let mut stats = GraphStats::default();
        for node in schema::ALL {
            stats.nodes.insert(
                node.label.to_string(),
                self.store.count_vertices(node).await?,
            );
            for relationship in node.relationships {
                stats.edges.insert(
                    format!("{}.{}", node.label, relationship.edge_type),
                    self.store
                        .count_edges(node, relationship.edge_type)
                        .await?,
                );
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraphStore;

    #[tokio::test]
    async fn stats_cover_every_declaration() {
        let repos = Repositories::new(Arc::new(MemoryGraphStore::new()));
        let stats = repos.stats().await.unwrap();

        assert_eq!(stats.nodes.len(), 9);
        let declared: usize = schema::ALL.iter().map(|s| s.relationships.len()).sum();
        assert_eq!(stats.edges.len(), declared);
        assert_eq!(stats.total_nodes(), 0);
        assert_eq!(stats.total_edges(), 0);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["edges"]["Appointment.FOLLOWS_UP"], 0);
    }
}
