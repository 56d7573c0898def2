use super::{
    push_many, push_one, read_many, read_one, vertex, Diagnosis, Doctor, FollowsUp, GraphEntity,
    Hospital, Link, Patient, Test,
};
use crate::graph::{get_opt, NodeRecord, PropertyValue};
use crate::schema::{self, NodeSchema};
use crate::GraphResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Appointment {
    pub appointment_id: String,
    pub date: Option<String>,
    /// Stored as `type`.
    pub kind: Option<String>,
    pub status: Option<String>,

    pub doctor: Option<Link<Doctor>>,
    pub hospital: Option<Link<Hospital>>,
    pub diagnoses: Vec<Link<Diagnosis>>,
    pub tests: Vec<Link<Test>>,
    pub follow_ups: Vec<FollowsUp>,
}

impl GraphEntity for Appointment {
    fn schema() -> &'static NodeSchema {
        &schema::APPOINTMENT
    }

    fn entity_id(&self) -> &str {
        &self.appointment_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.appointment_id,
            &[
                ("date", &self.date),
                ("type", &self.kind),
                ("status", &self.status),
            ],
        ));
        push_one(&mut record, "WITH_DOCTOR", &self.doctor);
        push_one(&mut record, "AT_HOSPITAL", &self.hospital);
        push_many(&mut record, "HAS_DIAGNOSIS", &self.diagnoses);
        push_many(&mut record, "HAS_TEST", &self.tests);
        push_many(&mut record, "FOLLOWS_UP", &self.follow_ups);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            appointment_id: record.vertex.id.clone(),
            date: get_opt(p, "date"),
            kind: get_opt(p, "type"),
            status: get_opt(p, "status"),
            doctor: read_one(&record, "WITH_DOCTOR")?,
            hospital: read_one(&record, "AT_HOSPITAL")?,
            diagnoses: read_many(&record, "HAS_DIAGNOSIS")?,
            tests: read_many(&record, "HAS_TEST")?,
            follow_ups: read_many(&record, "FOLLOWS_UP")?,
        })
    }
}

/// A notification raised about a patient, optionally addressed to a doctor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alert {
    pub alert_id: String,
    pub message: Option<String>,
    /// Stored as `type`, e.g. `MissedMedication` or `AbnormalTest`.
    pub kind: Option<String>,
    pub timestamp: Option<String>,
    pub resolved: bool,

    pub patient: Option<Link<Patient>>,
    pub doctor: Option<Link<Doctor>>,
}

impl GraphEntity for Alert {
    fn schema() -> &'static NodeSchema {
        &schema::ALERT
    }

    fn entity_id(&self) -> &str {
        &self.alert_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut vertex = vertex(
            Self::schema(),
            &self.alert_id,
            &[
                ("message", &self.message),
                ("type", &self.kind),
                ("timestamp", &self.timestamp),
            ],
        );
        vertex
            .properties
            .insert("resolved".into(), PropertyValue::Boolean(self.resolved));

        let mut record = NodeRecord::new(vertex);
        push_one(&mut record, "FOR_PATIENT", &self.patient);
        push_one(&mut record, "FOR_DOCTOR", &self.doctor);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            alert_id: record.vertex.id.clone(),
            message: get_opt(p, "message"),
            kind: get_opt(p, "type"),
            timestamp: get_opt(p, "timestamp"),
            resolved: p
                .get("resolved")
                .and_then(PropertyValue::as_bool)
                .unwrap_or(false),
            patient: read_one(&record, "FOR_PATIENT")?,
            doctor: read_one(&record, "FOR_DOCTOR")?,
        })
    }
}
