use super::{
    push_many, push_one, read_many, read_one, vertex, ForDiagnosis, ForTreatment, GraphEntity,
    LeadsTo, Link, PerformedAt, ResultedIn,
};
use crate::graph::{get_opt, NodeRecord};
use crate::schema::{self, NodeSchema};
use crate::GraphResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnosis {
    pub diagnosis_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub diagnosed_date: Option<String>,

    pub leads_to: Vec<LeadsTo>,
}

impl GraphEntity for Diagnosis {
    fn schema() -> &'static NodeSchema {
        &schema::DIAGNOSIS
    }

    fn entity_id(&self) -> &str {
        &self.diagnosis_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.diagnosis_id,
            &[
                ("name", &self.name),
                ("description", &self.description),
                ("diagnosedDate", &self.diagnosed_date),
            ],
        ));
        push_many(&mut record, "LEADS_TO", &self.leads_to);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            diagnosis_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            description: get_opt(p, "description"),
            diagnosed_date: get_opt(p, "diagnosedDate"),
            leads_to: read_many(&record, "LEADS_TO")?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Treatment {
    pub treatment_id: String,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,

    pub medications: Vec<Link<Medication>>,
    pub for_diagnoses: Vec<ForDiagnosis>,
    /// May point back at this treatment.
    pub for_treatments: Vec<ForTreatment>,
}

impl GraphEntity for Treatment {
    fn schema() -> &'static NodeSchema {
        &schema::TREATMENT
    }

    fn entity_id(&self) -> &str {
        &self.treatment_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.treatment_id,
            &[
                ("name", &self.name),
                ("startDate", &self.start_date),
                ("endDate", &self.end_date),
                ("status", &self.status),
            ],
        ));
        push_many(&mut record, "INVOLVES_MEDICATION", &self.medications);
        push_many(&mut record, "FOR_DIAGNOSIS", &self.for_diagnoses);
        push_many(&mut record, "FOR_TREATMENT", &self.for_treatments);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            treatment_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            start_date: get_opt(p, "startDate"),
            end_date: get_opt(p, "endDate"),
            status: get_opt(p, "status"),
            medications: read_many(&record, "INVOLVES_MEDICATION")?,
            for_diagnoses: read_many(&record, "FOR_DIAGNOSIS")?,
            for_treatments: read_many(&record, "FOR_TREATMENT")?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Medication {
    pub medication_id: String,
    pub drug_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_date: Option<String>,
    pub adherence: Option<String>,

    pub diagnosis: Option<ForDiagnosis>,
    pub for_treatments: Vec<ForTreatment>,
}

impl GraphEntity for Medication {
    fn schema() -> &'static NodeSchema {
        &schema::MEDICATION
    }

    fn entity_id(&self) -> &str {
        &self.medication_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.medication_id,
            &[
                ("drugName", &self.drug_name),
                ("dosage", &self.dosage),
                ("frequency", &self.frequency),
                ("prescribedDate", &self.prescribed_date),
                ("adherence", &self.adherence),
            ],
        ));
        push_one(&mut record, "FOR_DIAGNOSIS", &self.diagnosis);
        push_many(&mut record, "FOR_TREATMENT", &self.for_treatments);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            medication_id: record.vertex.id.clone(),
            drug_name: get_opt(p, "drugName"),
            dosage: get_opt(p, "dosage"),
            frequency: get_opt(p, "frequency"),
            prescribed_date: get_opt(p, "prescribedDate"),
            adherence: get_opt(p, "adherence"),
            diagnosis: read_one(&record, "FOR_DIAGNOSIS")?,
            for_treatments: read_many(&record, "FOR_TREATMENT")?,
        })
    }
}

/// A diagnostic test, such as a blood pressure reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Test {
    pub test_id: String,
    pub name: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,

    pub resulted_in: Vec<ResultedIn>,
    pub performed_at: Vec<PerformedAt>,
}

impl GraphEntity for Test {
    fn schema() -> &'static NodeSchema {
        &schema::TEST
    }

    fn entity_id(&self) -> &str {
        &self.test_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.test_id,
            &[
                ("name", &self.name),
                ("result", &self.result),
                ("date", &self.date),
                ("status", &self.status),
            ],
        ));
        push_many(&mut record, "RESULTED_IN", &self.resulted_in);
        push_many(&mut record, "PERFORMED_AT", &self.performed_at);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            test_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            result: get_opt(p, "result"),
            date: get_opt(p, "date"),
            status: get_opt(p, "status"),
            resulted_in: read_many(&record, "RESULTED_IN")?,
            performed_at: read_many(&record, "PERFORMED_AT")?,
        })
    }
}
