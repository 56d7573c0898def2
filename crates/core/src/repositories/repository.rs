//! Generic per-entity repository.
//!
//! A [`Repository`] has no query logic of its own: every operation is a schema-driven call
//! into the [`GraphStore`]. Saving upserts the node, rewrites the properties of relationship
//! records that already carry a store id, and creates the ones that do not. Removing a
//! record from an entity never deletes its edge.
//!
//! A new record on a `one` relationship replaces stored edges of that type pointing at a
//! different target. Stored edges to the same target are kept, so linking the same target
//! again appends a second edge and loading keeps returning the earliest one.
//!
//! A save is a sequence of independent store calls, not a transaction. When a call fails
//! after the node was written, the node and the edges created so far stay in the store and
//! their generated ids are lost with the error. Saving the same value again creates those
//! edges a second time; reload the entity before retrying.

use crate::graph::{GraphStore, NodeRecord};
use crate::model::GraphEntity;
use crate::schema::{self, Cardinality};
use crate::{GraphError, GraphResult};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Repository<T> {
    store: Arc<dyn GraphStore>,
    entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entity: PhantomData,
        }
    }
}

impl<T: GraphEntity> Repository<T> {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            entity: PhantomData,
        }
    }

    /// Saves `entity` and returns it with generated relationship ids filled in.
    ///
    /// # Errors
    ///
    /// Schema violations, missing relationship targets and persisted records with no
    /// matching stored edge (`MissingEdge`) are reported before anything is written. Store
    /// failures are returned as-is.
    pub async fn save(&self, entity: T) -> GraphResult<T> {
        let schema = T::schema();
        let mut record = entity.to_record();
        schema.validate(&record)?;
        self.check_targets(&record).await?;
        self.check_persisted(&record).await?;

        self.store.upsert_vertex(schema, &record.vertex).await?;

        let (mut created, mut updated, mut replaced) = (0, 0, 0);
        let source_id = record.vertex.id.clone();
        for edge in record.edges.iter_mut() {
            if edge.id.is_some() {
                self.store.update_edge(schema, &source_id, edge).await?;
                updated += 1;
                continue;
            }
            let single = schema
                .relationship(&edge.edge_type)
                .is_some_and(|declared| declared.cardinality == Cardinality::One);
            if single {
                replaced += self
                    .store
                    .detach_other_targets(schema, &source_id, edge)
                    .await?;
            }
            edge.id = Some(self.store.create_edge(schema, &source_id, edge).await?);
            created += 1;
        }

        tracing::debug!(
            "saved {} '{}' ({} new, {} updated, {} replaced relationships)",
            schema.label,
            source_id,
            created,
            updated,
            replaced
        );
        T::from_record(record)
    }

    pub async fn save_all(&self, entities: impl IntoIterator<Item = T>) -> GraphResult<Vec<T>> {
        let mut saved = Vec::new();
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: &str) -> GraphResult<Option<T>> {
        tracing::debug!("find {} '{}'", T::schema().label, id);
        self.store
            .fetch(T::schema(), id)
            .await?
            .map(T::from_record)
            .transpose()
    }

    pub async fn exists_by_id(&self, id: &str) -> GraphResult<bool> {
        self.store.exists(T::schema(), id).await
    }

    /// All entities of this type, ordered by id.
    pub async fn find_all(&self) -> GraphResult<Vec<T>> {
        tracing::debug!("find all {}", T::schema().label);
        self.store
            .fetch_all(T::schema())
            .await?
            .into_iter()
            .map(T::from_record)
            .collect()
    }

    pub async fn count(&self) -> GraphResult<usize> {
        self.store.count_vertices(T::schema()).await
    }

    /// Deletes the node and all edges touching it. Returns whether it existed.
    pub async fn delete_by_id(&self, id: &str) -> GraphResult<bool> {
        let deleted = self.store.delete_vertex(T::schema(), id).await?;
        tracing::debug!("delete {} '{}': {}", T::schema().label, id, deleted);
        Ok(deleted)
    }

    pub async fn delete_all(&self) -> GraphResult<usize> {
        let deleted = self.store.delete_vertices(T::schema()).await?;
        tracing::debug!("deleted {} {} nodes", deleted, T::schema().label);
        Ok(deleted)
    }

    /// Every unsaved edge must point at a node that already exists, or at the node being
    /// saved.
    async fn check_targets(&self, record: &NodeRecord) -> GraphResult<()> {
        let schema = T::schema();
        for edge in record.edges.iter().filter(|edge| edge.id.is_none()) {
            if edge.target_label == schema.label && edge.target_id == record.vertex.id {
                continue;
            }
            let target = schema::lookup(&edge.target_label)?;
            if !self.store.exists(target, &edge.target_id).await? {
                return Err(GraphError::MissingTarget {
                    label: schema.label,
                    id: record.vertex.id.clone(),
                    edge_type: edge.edge_type.clone(),
                    target_label: edge.target_label.clone(),
                    target_id: edge.target_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every record that carries a store id must still match a stored edge of the same type
    /// and target.
    async fn check_persisted(&self, record: &NodeRecord) -> GraphResult<()> {
        let schema = T::schema();
        let mut persisted = record.edges.iter().filter(|edge| edge.id.is_some()).peekable();
        if persisted.peek().is_none() {
            return Ok(());
        }
        let stored = self
            .store
            .fetch(schema, &record.vertex.id)
            .await?
            .map(|found| found.edges)
            .unwrap_or_default();
        for edge in persisted {
            let matched = stored.iter().any(|s| {
                s.id == edge.id
                    && s.edge_type == edge.edge_type
                    && s.target_label == edge.target_label
                    && s.target_id == edge.target_id
            });
            if !matched {
                return Err(GraphError::MissingEdge {
                    label: schema.label,
                    id: record.vertex.id.clone(),
                    edge_type: edge.edge_type.clone(),
                    edge_id: edge.id.unwrap_or_default(),
                    target_label: edge.target_label.clone(),
                    target_id: edge.target_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, MemoryGraphStore, Vertex};
    use crate::model::{
        Appointment, Diagnosis, Doctor, HasDiagnosis, Hospital, Link, Patient, Treatment,
    };
    use crate::schema::NodeSchema;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Memory store whose `create_edge` starts failing once `edges_left` edges were created.
    struct EdgeBudgetStore {
        inner: MemoryGraphStore,
        edges_left: AtomicUsize,
    }

    #[async_trait]
    impl GraphStore for EdgeBudgetStore {
        fn backend_name(&self) -> &'static str {
            self.inner.backend_name()
        }

        async fn ping(&self) -> GraphResult<()> {
            self.inner.ping().await
        }

        async fn upsert_vertex(
            &self,
            schema: &'static NodeSchema,
            vertex: &Vertex,
        ) -> GraphResult<()> {
            self.inner.upsert_vertex(schema, vertex).await
        }

        async fn create_edge(
            &self,
            schema: &'static NodeSchema,
            source_id: &str,
            edge: &Edge,
        ) -> GraphResult<i64> {
            let left = self.edges_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(GraphError::InvalidInput("connection reset".into()));
            }
            self.edges_left.store(left - 1, Ordering::SeqCst);
            self.inner.create_edge(schema, source_id, edge).await
        }

        async fn update_edge(
            &self,
            schema: &'static NodeSchema,
            source_id: &str,
            edge: &Edge,
        ) -> GraphResult<()> {
            self.inner.update_edge(schema, source_id, edge).await
        }

        async fn detach_other_targets(
            &self,
            schema: &'static NodeSchema,
            source_id: &str,
            edge: &Edge,
        ) -> GraphResult<usize> {
            self.inner.detach_other_targets(schema, source_id, edge).await
        }

        async fn fetch(
            &self,
            schema: &'static NodeSchema,
            id: &str,
        ) -> GraphResult<Option<NodeRecord>> {
            self.inner.fetch(schema, id).await
        }

        async fn fetch_all(&self, schema: &'static NodeSchema) -> GraphResult<Vec<NodeRecord>> {
            self.inner.fetch_all(schema).await
        }

        async fn exists(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
            self.inner.exists(schema, id).await
        }

        async fn count_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
            self.inner.count_vertices(schema).await
        }

        async fn count_edges(
            &self,
            schema: &'static NodeSchema,
            edge_type: &str,
        ) -> GraphResult<usize> {
            self.inner.count_edges(schema, edge_type).await
        }

        async fn delete_vertex(&self, schema: &'static NodeSchema, id: &str) -> GraphResult<bool> {
            self.inner.delete_vertex(schema, id).await
        }

        async fn delete_vertices(&self, schema: &'static NodeSchema) -> GraphResult<usize> {
            self.inner.delete_vertices(schema).await
        }
    }

    fn store() -> Arc<dyn GraphStore> {
        Arc::new(MemoryGraphStore::new())
    }

    fn diagnosis(id: &str) -> Diagnosis {
        Diagnosis {
            diagnosis_id: id.into(),
            name: Some("Hypertension".into()),
            ..Diagnosis::default()
        }
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let store = store();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store);

        let diagnosis = diagnoses.save(diagnosis("diag1")).await.unwrap();
        let patient = Patient {
            patient_id: "pat1".into(),
            name: Some("John Doe".into()),
            diagnoses: vec![HasDiagnosis {
                diagnosed_date: Some("2024-01-15".into()),
                ..HasDiagnosis::to(&diagnosis)
            }],
            ..Patient::default()
        };

        let saved = patients.save(patient).await.unwrap();
        assert!(saved.diagnoses[0].id.is_some());

        let found = patients
            .find_by_id("pat1")
            .await
            .unwrap()
            .expect("patient should exist");
        assert_eq!(found, saved);
        assert!(patients.exists_by_id("pat1").await.unwrap());
        assert!(patients.find_by_id("pat2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persisted_relationships_are_not_recreated() {
        let store = store();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store.clone());
        let first = diagnoses.save(diagnosis("diag1")).await.unwrap();
        let second = diagnoses.save(diagnosis("diag2")).await.unwrap();

        let mut patient = patients
            .save(Patient {
                patient_id: "pat1".into(),
                diagnoses: vec![HasDiagnosis::to(&first)],
                ..Patient::default()
            })
            .await
            .unwrap();
        patient.diagnoses.push(HasDiagnosis::to(&second));
        let patient = patients.save(patient).await.unwrap();
        let patient = patients.save(patient).await.unwrap();

        assert_eq!(patient.diagnoses.len(), 2);
        assert_eq!(
            store
                .count_edges(Patient::schema(), "HAS_DIAGNOSIS")
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn dropping_a_record_keeps_the_stored_edge() {
        let store = store();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store);
        let diagnosis = diagnoses.save(diagnosis("diag1")).await.unwrap();

        let mut patient = patients
            .save(Patient {
                patient_id: "pat1".into(),
                diagnoses: vec![HasDiagnosis::to(&diagnosis)],
                ..Patient::default()
            })
            .await
            .unwrap();
        patient.diagnoses.clear();
        patients.save(patient).await.unwrap();

        let found = patients.find_by_id("pat1").await.unwrap().unwrap();
        assert_eq!(found.diagnoses.len(), 1);
    }

    #[tokio::test]
    async fn missing_target_fails_before_writing() {
        let appointments = Repository::<Appointment>::new(store());
        let err = appointments
            .save(Appointment {
                appointment_id: "appt1".into(),
                doctor: Some(Link::new("doc1")),
                ..Appointment::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::MissingTarget { .. }));
        assert_eq!(appointments.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn self_link_is_allowed_on_first_save() {
        let treatments = Repository::<Treatment>::new(store());
        let treatment = Treatment {
            treatment_id: "treat1".into(),
            for_treatments: vec![Link::new("treat1")],
            ..Treatment::default()
        };
        let saved = treatments.save(treatment).await.unwrap();
        assert!(saved.for_treatments[0].id.is_some());
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_id() {
        let hospitals = Repository::<Hospital>::new(store());
        let saved = hospitals
            .save_all(["hosp2", "hosp1", "hosp3"].map(|id| Hospital {
                hospital_id: id.into(),
                ..Hospital::default()
            }))
            .await
            .unwrap();
        assert_eq!(saved.len(), 3);

        let ids: Vec<String> = hospitals
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.hospital_id)
            .collect();
        assert_eq!(ids, vec!["hosp1", "hosp2", "hosp3"]);
        assert_eq!(hospitals.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_detaches_relationships() {
        let store = store();
        let doctors = Repository::<Doctor>::new(store.clone());
        let appointments = Repository::<Appointment>::new(store);
        let doctor = doctors
            .save(Doctor {
                doctor_id: "doc1".into(),
                ..Doctor::default()
            })
            .await
            .unwrap();
        appointments
            .save(Appointment {
                appointment_id: "appt1".into(),
                doctor: Some(Link::to(&doctor)),
                ..Appointment::default()
            })
            .await
            .unwrap();

        assert!(doctors.delete_by_id("doc1").await.unwrap());
        assert!(!doctors.delete_by_id("doc1").await.unwrap());

        let appointment = appointments.find_by_id("appt1").await.unwrap().unwrap();
        assert!(appointment.doctor.is_none());
        assert_eq!(appointments.delete_all().await.unwrap(), 1);
        assert_eq!(appointments.count().await.unwrap(), 0);
    }

    async fn doctors(store: &Arc<dyn GraphStore>, ids: &[&str]) {
        let doctors = Repository::<Doctor>::new(store.clone());
        for id in ids {
            doctors
                .save(Doctor {
                    doctor_id: id.to_string(),
                    ..Doctor::default()
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn edited_relationship_properties_are_persisted() {
        let store = store();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store.clone());
        let diagnosis = diagnoses.save(diagnosis("diag1")).await.unwrap();

        let mut patient = patients
            .save(Patient {
                patient_id: "pat1".into(),
                diagnoses: vec![HasDiagnosis {
                    diagnosed_date: Some("2024-01-15".into()),
                    ..HasDiagnosis::to(&diagnosis)
                }],
                ..Patient::default()
            })
            .await
            .unwrap();
        patient.diagnoses[0].diagnosed_date = Some("2024-02-01".into());
        let saved = patients.save(patient).await.unwrap();

        let found = patients.find_by_id("pat1").await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.diagnoses[0].diagnosed_date.as_deref(), Some("2024-02-01"));
        assert_eq!(
            store
                .count_edges(Patient::schema(), "HAS_DIAGNOSIS")
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn replacing_a_single_link_moves_the_edge() {
        let store = store();
        doctors(&store, &["doc1", "doc2"]).await;
        let appointments = Repository::<Appointment>::new(store.clone());

        let mut appointment = appointments
            .save(Appointment {
                appointment_id: "appt1".into(),
                doctor: Some(Link::new("doc1")),
                ..Appointment::default()
            })
            .await
            .unwrap();
        appointment.doctor = Some(Link::new("doc2"));
        let saved = appointments.save(appointment).await.unwrap();

        let found = appointments.find_by_id("appt1").await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.doctor.unwrap().target_id, "doc2");
        assert_eq!(
            store
                .count_edges(Appointment::schema(), "WITH_DOCTOR")
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn linking_the_same_single_target_again_appends() {
        let store = store();
        doctors(&store, &["doc1"]).await;
        let appointments = Repository::<Appointment>::new(store.clone());
        let appointment = || Appointment {
            appointment_id: "appt1".into(),
            doctor: Some(Link::new("doc1")),
            ..Appointment::default()
        };

        let first = appointments.save(appointment()).await.unwrap();
        appointments.save(appointment()).await.unwrap();

        assert_eq!(
            store
                .count_edges(Appointment::schema(), "WITH_DOCTOR")
                .await
                .unwrap(),
            2
        );
        let found = appointments.find_by_id("appt1").await.unwrap().unwrap();
        assert_eq!(found.doctor, first.doctor);
    }

    #[tokio::test]
    async fn unknown_persisted_record_fails_before_writing() {
        let store = store();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store);
        let diagnosis = diagnoses.save(diagnosis("diag1")).await.unwrap();

        let err = patients
            .save(Patient {
                patient_id: "pat1".into(),
                diagnoses: vec![HasDiagnosis {
                    id: Some(42),
                    ..HasDiagnosis::to(&diagnosis)
                }],
                ..Patient::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::MissingEdge { edge_id: 42, .. }));
        assert_eq!(patients.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_save_leaves_earlier_writes_in_place() {
        let budget = Arc::new(EdgeBudgetStore {
            inner: MemoryGraphStore::new(),
            edges_left: AtomicUsize::new(1),
        });
        let store: Arc<dyn GraphStore> = budget.clone();
        let diagnoses = Repository::<Diagnosis>::new(store.clone());
        let patients = Repository::<Patient>::new(store.clone());
        let first = diagnoses.save(diagnosis("diag1")).await.unwrap();
        let second = diagnoses.save(diagnosis("diag2")).await.unwrap();
        let patient = Patient {
            patient_id: "pat1".into(),
            diagnoses: vec![HasDiagnosis::to(&first), HasDiagnosis::to(&second)],
            ..Patient::default()
        };

        assert!(patients.save(patient.clone()).await.is_err());
        let found = patients.find_by_id("pat1").await.unwrap().unwrap();
        assert_eq!(found.diagnoses.len(), 1);

        budget.edges_left.store(usize::MAX, Ordering::SeqCst);
        patients.save(patient).await.unwrap();
        assert_eq!(
            store
                .count_edges(Patient::schema(), "HAS_DIAGNOSIS")
                .await
                .unwrap(),
            3
        );
    }
}
