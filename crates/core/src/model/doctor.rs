use super::{
    push_many, read_many, vertex, Consulted, GraphEntity, Ordered, Performed, PracticesAt,
    Prescribed,
};
use crate::graph::{get_opt, NodeRecord};
use crate::schema::{self, NodeSchema};
use crate::GraphResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctor {
    pub doctor_id: String,
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub contact_number: Option<String>,
    pub qualifications: Option<String>,
    pub email: Option<String>,

    pub practices_at: Vec<PracticesAt>,
    pub performed: Vec<Performed>,
    pub ordered: Vec<Ordered>,
    pub prescribed: Vec<Prescribed>,
    pub consulted: Vec<Consulted>,
}

impl GraphEntity for Doctor {
    fn schema() -> &'static NodeSchema {
        &schema::DOCTOR
    }

    fn entity_id(&self) -> &str {
        &self.doctor_id
    }

    fn to_record(&self) -> NodeRecord {
        let mut record = NodeRecord::new(vertex(
            Self::schema(),
            &self.doctor_id,
            &[
                ("name", &self.name),
                ("specialty", &self.specialty),
                ("contactNumber", &self.contact_number),
                ("qualifications", &self.qualifications),
                ("email", &self.email),
            ],
        ));
        push_many(&mut record, "PRACTICES_AT", &self.practices_at);
        push_many(&mut record, "PERFORMED", &self.performed);
        push_many(&mut record, "ORDERED", &self.ordered);
        push_many(&mut record, "PRESCRIBED", &self.prescribed);
        push_many(&mut record, "CONSULTED", &self.consulted);
        record
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            doctor_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            specialty: get_opt(p, "specialty"),
            contact_number: get_opt(p, "contactNumber"),
            qualifications: get_opt(p, "qualifications"),
            email: get_opt(p, "email"),
            practices_at: read_many(&record, "PRACTICES_AT")?,
            performed: read_many(&record, "PERFORMED")?,
            ordered: read_many(&record, "ORDERED")?,
            prescribed: read_many(&record, "PRESCRIBED")?,
            consulted: read_many(&record, "CONSULTED")?,
        })
    }
}

/// A care site. Hospitals only appear as relationship targets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hospital {
    pub hospital_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    /// Stored as `type`.
    pub kind: Option<String>,
}

impl GraphEntity for Hospital {
    fn schema() -> &'static NodeSchema {
        &schema::HOSPITAL
    }

    fn entity_id(&self) -> &str {
        &self.hospital_id
    }

    fn to_record(&self) -> NodeRecord {
        NodeRecord::new(vertex(
            Self::schema(),
            &self.hospital_id,
            &[
                ("name", &self.name),
                ("location", &self.location),
                ("contactNumber", &self.contact_number),
                ("type", &self.kind),
            ],
        ))
    }

    fn from_record(record: NodeRecord) -> GraphResult<Self> {
        let p = &record.vertex.properties;
        Ok(Self {
            hospital_id: record.vertex.id.clone(),
            name: get_opt(p, "name"),
            location: get_opt(p, "location"),
            contact_number: get_opt(p, "contactNumber"),
            kind: get_opt(p, "type"),
        })
    }
}
