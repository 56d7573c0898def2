//! Static registration table of node labels, properties and relationships.
//!
//! Every entity type registers one [`NodeSchema`]. Repositories consult it to validate a node
//! before anything is written and to decide which outgoing edges belong to an entity when it
//! is loaded. Stored property names are camelCase and ids live under `<entity>Id`.

use crate::graph::NodeRecord;
use crate::{GraphError, GraphResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertySchema {
    pub name: &'static str,
    pub kind: PropertyKind,
}

const fn text(name: &'static str) -> PropertySchema {
    PropertySchema {
        name,
        kind: PropertyKind::String,
    }
}

const fn flag(name: &'static str) -> PropertySchema {
    PropertySchema {
        name,
        kind: PropertyKind::Boolean,
    }
}

/// How many edges of one type a node may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelationshipSchema {
    pub edge_type: &'static str,
    pub targets: &'static [&'static str],
    pub cardinality: Cardinality,
    /// Edge property names. All edge properties are strings.
    pub properties: &'static [&'static str],
}

const fn many(
    edge_type: &'static str,
    targets: &'static [&'static str],
    properties: &'static [&'static str],
) -> RelationshipSchema {
    RelationshipSchema {
        edge_type,
        targets,
        cardinality: Cardinality::Many,
        properties,
    }
}

const fn one(edge_type: &'static str, target: &'static [&'static str]) -> RelationshipSchema {
    RelationshipSchema {
        edge_type,
        targets: target,
        cardinality: Cardinality::One,
        properties: &[],
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct NodeSchema {
    pub label: &'static str,
    pub id_field: &'static str,
    pub properties: &'static [PropertySchema],
    pub relationships: &'static [RelationshipSchema],
}

pub const PATIENT_LABEL: &str = "Patient";
pub const DOCTOR_LABEL: &str = "Doctor";
pub const HOSPITAL_LABEL: &str = "Hospital";
pub const APPOINTMENT_LABEL: &str = "Appointment";
pub const DIAGNOSIS_LABEL: &str = "Diagnosis";
pub const TREATMENT_LABEL: &str = "Treatment";
pub const MEDICATION_LABEL: &str = "Medication";
pub const TEST_LABEL: &str = "Test";
pub const ALERT_LABEL: &str = "Alert";

pub static PATIENT: NodeSchema = NodeSchema {
    label: PATIENT_LABEL,
    id_field: "patientId",
    properties: &[
        text("name"),
        text("dob"),
        text("gender"),
        text("contactNumber"),
        text("address"),
        text("bloodGroup"),
        text("insuranceProvider"),
        text("currentStatus"),
    ],
    relationships: &[
        many("HAS_DIAGNOSIS", &[DIAGNOSIS_LABEL], &["diagnosedDate"]),
        many("RECEIVES_TREATMENT", &[TREATMENT_LABEL], &["startDate", "endDate"]),
        many(
            "TAKES_MEDICATION",
            &[MEDICATION_LABEL],
            &["prescribedDate", "adherence"],
        ),
        many(
            "HAS_APPOINTMENT",
            &[APPOINTMENT_LABEL],
            &["appointmentDate", "appointmentType", "status"],
        ),
        many("UNDERWENT_TEST", &[TEST_LABEL], &["performedDate"]),
        many(
            "ADMITTED_TO",
            &[HOSPITAL_LABEL],
            &["admissionDate", "dischargeDate"],
        ),
        many("CARED_FOR_BY", &[DOCTOR_LABEL], &["startDate"]),
    ],
};

pub static DOCTOR: NodeSchema = NodeSchema {
    label: DOCTOR_LABEL,
    id_field: "doctorId",
    properties: &[
        text("name"),
        text("specialty"),
        text("contactNumber"),
        text("qualifications"),
        text("email"),
    ],
    relationships: &[
        many("PRACTICES_AT", &[HOSPITAL_LABEL], &["startDate"]),
        many("PERFORMED", &[TREATMENT_LABEL], &["performedDate"]),
        many("ORDERED", &[TEST_LABEL], &["orderedDate"]),
        many("PRESCRIBED", &[MEDICATION_LABEL], &["prescribedDate"]),
        many("CONSULTED", &[PATIENT_LABEL], &["consultationDate"]),
    ],
};

pub static HOSPITAL: NodeSchema = NodeSchema {
    label: HOSPITAL_LABEL,
    id_field: "hospitalId",
    properties: &[
        text("name"),
        text("location"),
        text("contactNumber"),
        text("type"),
    ],
    relationships: &[],
};

pub static APPOINTMENT: NodeSchema = NodeSchema {
    label: APPOINTMENT_LABEL,
    id_field: "appointmentId",
    properties: &[text("date"), text("type"), text("status")],
    relationships: &[
        one("WITH_DOCTOR", &[DOCTOR_LABEL]),
        one("AT_HOSPITAL", &[HOSPITAL_LABEL]),
        many("HAS_DIAGNOSIS", &[DIAGNOSIS_LABEL], &[]),
        many("HAS_TEST", &[TEST_LABEL], &[]),
        many("FOLLOWS_UP", &[TREATMENT_LABEL, DIAGNOSIS_LABEL], &[]),
    ],
};

pub static DIAGNOSIS: NodeSchema = NodeSchema {
    label: DIAGNOSIS_LABEL,
    id_field: "diagnosisId",
    properties: &[text("name"), text("description"), text("diagnosedDate")],
    relationships: &[many("LEADS_TO", &[TREATMENT_LABEL], &[])],
};

pub static TREATMENT: NodeSchema = NodeSchema {
    label: TREATMENT_LABEL,
    id_field: "treatmentId",
    properties: &[
        text("name"),
        text("startDate"),
        text("endDate"),
        text("status"),
    ],
    relationships: &[
        many("INVOLVES_MEDICATION", &[MEDICATION_LABEL], &[]),
        many("FOR_DIAGNOSIS", &[DIAGNOSIS_LABEL], &[]),
        many("FOR_TREATMENT", &[TREATMENT_LABEL], &[]),
    ],
};

pub static MEDICATION: NodeSchema = NodeSchema {
    label: MEDICATION_LABEL,
    id_field: "medicationId",
    properties: &[
        text("drugName"),
        text("dosage"),
        text("frequency"),
        text("prescribedDate"),
        text("adherence"),
    ],
    relationships: &[
        one("FOR_DIAGNOSIS", &[DIAGNOSIS_LABEL]),
        many("FOR_TREATMENT", &[TREATMENT_LABEL], &[]),
    ],
};

pub static TEST: NodeSchema = NodeSchema {
    label: TEST_LABEL,
    id_field: "testId",
    properties: &[text("name"), text("result"), text("date"), text("status")],
    relationships: &[
        many("RESULTED_IN", &[DIAGNOSIS_LABEL], &["resultImpact"]),
        many("PERFORMED_AT", &[HOSPITAL_LABEL], &["performedDate"]),
    ],
};

pub static ALERT: NodeSchema = NodeSchema {
    label: ALERT_LABEL,
    id_field: "alertId",
    properties: &[
        text("message"),
        text("type"),
        text("timestamp"),
        flag("resolved"),
    ],
    relationships: &[
        one("FOR_PATIENT", &[PATIENT_LABEL]),
        one("FOR_DOCTOR", &[DOCTOR_LABEL]),
    ],
};

/// Every registered label, in seeding order.
pub static ALL: [&NodeSchema; 9] = [
    &DOCTOR,
    &HOSPITAL,
    &DIAGNOSIS,
    &TREATMENT,
    &MEDICATION,
    &APPOINTMENT,
    &TEST,
    &ALERT,
    &PATIENT,
];

/// Finds the schema registered for `label`.
pub fn lookup(label: &str) -> GraphResult<&'static NodeSchema> {
    ALL.iter()
        .copied()
        .find(|schema| schema.label == label)
        .ok_or_else(|| GraphError::UnknownLabel(label.to_string()))
}

impl NodeSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn relationship(&self, edge_type: &str) -> Option<&'static RelationshipSchema> {
        let relationships: &'static [RelationshipSchema] = self.relationships;
        relationships.iter().find(|r| r.edge_type == edge_type)
    }

    /// Declared outgoing edge types, in declaration order.
    pub fn edge_types(&self) -> Vec<&'static str> {
        self.relationships.iter().map(|r| r.edge_type).collect()
    }

    /// Checks a node against this registration before it is written.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank id, a label mismatch or a property of the wrong kind.
    /// - `UndeclaredProperty` for node or edge properties that are not registered.
    /// - `UndeclaredRelationship` / `UnexpectedTarget` for edges that are not registered.
    /// - `CardinalityExceeded` when a `one` relationship holds more than one edge.
    pub fn validate(&self, record: &NodeRecord) -> GraphResult<()> {
        let vertex = &record.vertex;
        if vertex.label != self.label {
            return Err(GraphError::InvalidInput(format!(
                "expected a {} node, got {}",
                self.label, vertex.label
            )));
        }
        if vertex.id.trim().is_empty() {
            return Err(GraphError::InvalidInput(format!(
                "{} id cannot be empty",
                self.label
            )));
        }

        for (key, value) in &vertex.properties {
            let declared = self
                .property(key)
                .ok_or_else(|| GraphError::UndeclaredProperty {
                    label: self.label,
                    key: key.clone(),
                })?;
            let matches = match declared.kind {
                PropertyKind::String => value.as_str().is_some(),
                PropertyKind::Boolean => value.as_bool().is_some(),
            };
            if !matches {
                return Err(GraphError::InvalidInput(format!(
                    "{}.{key} must be a {:?} value",
                    self.label, declared.kind
                )));
            }
        }

        for edge in &record.edges {
            let declared = self.relationship(&edge.edge_type).ok_or_else(|| {
                GraphError::UndeclaredRelationship {
                    label: self.label,
                    edge_type: edge.edge_type.clone(),
                }
            })?;
            if !declared.targets.contains(&edge.target_label.as_str()) {
                return Err(GraphError::UnexpectedTarget {
                    label: self.label,
                    edge_type: edge.edge_type.clone(),
                    target_label: edge.target_label.clone(),
                });
            }
            if let Some(key) = edge
                .properties
                .keys()
                .find(|key| !declared.properties.contains(&key.as_str()))
            {
                return Err(GraphError::UndeclaredProperty {
                    label: self.label,
                    key: format!("{}.{key}", edge.edge_type),
                });
            }
        }

        for declared in self.relationships {
            if declared.cardinality == Cardinality::One {
                let count = record
                    .edges
                    .iter()
                    .filter(|edge| edge.edge_type == declared.edge_type)
                    .count();
                if count > 1 {
                    return Err(GraphError::CardinalityExceeded {
                        label: self.label,
                        edge_type: declared.edge_type,
                        count,
                    });
                }
            }
        }

        Ok(())
    }
}
