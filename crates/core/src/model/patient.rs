use super::{
    push_many, read_many, vertex, AdmittedTo, CaredForBy, GraphEntity, HasAppointment,
    HasDiagnosis, ReceivesTreatment, TakesMedication, UnderwentTest,
};
use crate::graph::{get_opt, NodeRecord};
use crate::schema::{self, NodeSchema};
use crate::GraphResult;

/// A person receiving care. Owns the richest set of relationships in the model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: String,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub insurance_provider: Option<String>,
    pub current_status: Option<String>,

    pub diagnoses: Vec<HasDiagnosis>,
    pub treatments: Vec<ReceivesTreatment>,
    pub medications: Vec<TakesMedication>,
    pub appointments: Vec<HasAppointment>,
    pub tests: Vec<UnderwentTest>,
    pub admissions: Vec<AdmittedTo>,
    pub care_team: Vec<CaredForBy>,
}

impl GraphEntity for Patient {
    fn schema() -> &'static NodeSchema {
        &schema::PATIENT
    }

    fn entity_id(&self) -> &str {
        &self.patient_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.patient_id,
            &[
                ("name", &self.name),
                ("dob", &self.dob),
                ("gender", &self.gender),
                ("contactNumber", &self.contact_number),
                ("address", &self.address),
                ("bloodGroup", &self.blood_group),
                ("insuranceProvider", &self.insurance_provider),
                ("currentStatus", &self.current_status),
            ],
        ));
        push_many(&mut record, "HAS_DIAGNOSIS", &self.diagnoses);
        push_many(&mut record, "RECEIVES_TREATMENT", &self.treatments);
        push_many(&mut record, "TAKES_MEDICATION", &self.medications);
        push_many(&mut record, "HAS_APPOINTMENT", &self.appointments);
        push_many(&mut record, "UNDERWENT_TEST", &self.tests);
        push_many(&mut record, "ADMITTED_TO", &self.admissions);
        push_many(&mut record, "CARED_FOR_BY", &self.care_team);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            patient_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            dob: get_opt(p, "dob"),
            gender: get_opt(p, "gender"),
            contact_number: get_opt(p, "contactNumber"),
            address: get_opt(p, "address"),
            blood_group: get_opt(p, "bloodGroup"),
            insurance_provider: get_opt(p, "insuranceProvider"),
            current_status: get_opt(p, "currentStatus"),
            diagnoses: read_many(&record, "HAS_DIAGNOSIS")?,
            treatments: read_many(&record, "RECEIVES_TREATMENT")?,
            medications: read_many(&record, "TAKES_MEDICATION")?,
            appointments: read_many(&record, "HAS_APPOINTMENT")?,
            tests: read_many(&record, "UNDERWENT_TEST")?,
            admissions: read_many(&record, "ADMITTED_TO")?,
            care_team: read_many(&record, "CARED_FOR_BY")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_stored_property_names() {
        let patient = Patient {
            patient_id: "pat1".into(),
            name: Some("John Doe".into()),
            blood_group: Some("A+".into()),
            care_team: vec![CaredForBy {
                doctor_id: "doc1".into(),
                start_date: Some("2024-01-15".into()),
                ..CaredForBy::default()
            }],
            ..Patient::default()
        };

        let record = patient.to_record();
        assert_eq!(record.vertex.label, "Patient");
        assert!(record.vertex.properties.contains_key("bloodGroup"));
        assert!(!record.vertex.properties.contains_key("dob"));
        assert_eq!(record.edges.len(), 1);
        assert_eq!(record.edges[0].edge_type, "CARED_FOR_BY");
        Patient::schema()
            .validate(&record)
            .expect("patient record should validate");

        assert_eq!(Patient::from_record(record).unwrap(), patient);
    }
}
