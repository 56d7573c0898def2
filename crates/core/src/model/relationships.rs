use super::{
    Appointment, Diagnosis, Doctor, GraphEntity, Hospital, Medication, Patient, Relationship,
    Test, Treatment,
};
use crate::graph::{get_opt, put_opt, Edge, PropertyMap};
use crate::schema::{DIAGNOSIS_LABEL, TREATMENT_LABEL};
use crate::{GraphError, GraphResult};
use std::fmt;
use std::marker::PhantomData;

fn props(fields: &[(&str, &Option<String>)]) -> PropertyMap {
    let mut map = PropertyMap::new();
    for (key, value) in fields {
        put_opt(&mut map, key, value);
    }
    map
}

/// A property-less edge to an entity of type `T`.
pub struct Link<T> {
    pub id: Option<i64>,
    pub target_id: String,
    target: PhantomData<fn() -> T>,
}

impl<T: GraphEntity> Link<T> {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            id: None,
            target_id: target_id.into(),
            target: PhantomData,
        }
    }

    pub fn to(entity: &T) -> Self {
        Self::new(entity.entity_id())
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            target_id: self.target_id.clone(),
            target: PhantomData,
        }
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.target_id == other.target_id
    }
}

impl<T> Eq for Link<T> {}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("id", &self.id)
            .field("target_id", &self.target_id)
            .finish()
    }
}

impl<T: GraphEntity> Relationship for Link<T> {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (T::schema().label, &self.target_id)
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            target_id: edge.target_id.clone(),
            target: PhantomData,
        })
    }
}

/// Diagnosis LEADS_TO Treatment.
pub type LeadsTo = Link<Treatment>;
/// Treatment or Medication FOR_DIAGNOSIS Diagnosis.
pub type ForDiagnosis = Link<Diagnosis>;
/// Treatment or Medication FOR_TREATMENT Treatment.
pub type ForTreatment = Link<Treatment>;

/// What an appointment follows up on. The variant is the target node's label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FollowUpTarget {
    Treatment(String),
    Diagnosis(String),
}

impl FollowUpTarget {
    pub fn id(&self) -> &str {
        match self {
            FollowUpTarget::Treatment(id) | FollowUpTarget::Diagnosis(id) => id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FollowUpTarget::Treatment(_) => TREATMENT_LABEL,
            FollowUpTarget::Diagnosis(_) => DIAGNOSIS_LABEL,
        }
    }
}

/// Appointment FOLLOWS_UP a treatment or a diagnosis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowsUp {
    pub id: Option<i64>,
    pub target: FollowUpTarget,
}

impl FollowsUp {
    pub fn treatment(treatment: &Treatment) -> Self {
        Self {
            id: None,
            target: FollowUpTarget::Treatment(treatment.treatment_id.clone()),
        }
    }

    pub fn diagnosis(diagnosis: &Diagnosis) -> Self {
        Self {
            id: None,
            target: FollowUpTarget::Diagnosis(diagnosis.diagnosis_id.clone()),
        }
    }
}

impl Relationship for FollowsUp {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (self.target.label(), self.target.id())
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        let id = edge.target_id.clone();
        let target = match edge.target_label.as_str() {
            TREATMENT_LABEL => FollowUpTarget::Treatment(id),
            DIAGNOSIS_LABEL => FollowUpTarget::Diagnosis(id),
            other => {
                return Err(GraphError::UnexpectedTarget {
                    label: crate::schema::APPOINTMENT_LABEL,
                    edge_type: edge.edge_type.clone(),
                    target_label: other.to_string(),
                })
            }
        };
        Ok(Self {
            id: edge.id,
            target,
        })
    }
}

/// Patient HAS_DIAGNOSIS Diagnosis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HasDiagnosis {
    pub id: Option<i64>,
    pub diagnosis_id: String,
    pub diagnosed_date: Option<String>,
}

impl HasDiagnosis {
    pub fn to(diagnosis: &Diagnosis) -> Self {
        Self {
            diagnosis_id: diagnosis.diagnosis_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for HasDiagnosis {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Diagnosis::schema().label, &self.diagnosis_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("diagnosedDate", &self.diagnosed_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            diagnosis_id: edge.target_id.clone(),
            diagnosed_date: get_opt(&edge.properties, "diagnosedDate"),
        })
    }
}

/// Patient RECEIVES_TREATMENT Treatment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceivesTreatment {
    pub id: Option<i64>,
    pub treatment_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReceivesTreatment {
    pub fn to(treatment: &Treatment) -> Self {
        Self {
            treatment_id: treatment.treatment_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for ReceivesTreatment {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Treatment::schema().label, &self.treatment_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("startDate", &self.start_date), ("endDate", &self.end_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            treatment_id: edge.target_id.clone(),
            start_date: get_opt(&edge.properties, "startDate"),
            end_date: get_opt(&edge.properties, "endDate"),
        })
    }
}

/// Patient TAKES_MEDICATION Medication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TakesMedication {
    pub id: Option<i64>,
    pub medication_id: String,
    pub prescribed_date: Option<String>,
    pub adherence: Option<String>,
}

impl TakesMedication {
    pub fn to(medication: &Medication) -> Self {
        Self {
            medication_id: medication.medication_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for TakesMedication {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Medication::schema().label, &self.medication_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[
            ("prescribedDate", &self.prescribed_date),
            ("adherence", &self.adherence),
        ])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            medication_id: edge.target_id.clone(),
            prescribed_date: get_opt(&edge.properties, "prescribedDate"),
            adherence: get_opt(&edge.properties, "adherence"),
        })
    }
}

/// Patient HAS_APPOINTMENT Appointment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HasAppointment {
    pub id: Option<i64>,
    pub appointment_id: String,
    pub appointment_date: Option<String>,
    pub appointment_type: Option<String>,
    pub status: Option<String>,
}

impl HasAppointment {
    pub fn to(appointment: &Appointment) -> Self {
        Self {
            appointment_id: appointment.appointment_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for HasAppointment {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Appointment::schema().label, &self.appointment_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[
            ("appointmentDate", &self.appointment_date),
            ("appointmentType", &self.appointment_type),
            ("status", &self.status),
        ])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            appointment_id: edge.target_id.clone(),
            appointment_date: get_opt(&edge.properties, "appointmentDate"),
            appointment_type: get_opt(&edge.properties, "appointmentType"),
            status: get_opt(&edge.properties, "status"),
        })
    }
}

/// Patient UNDERWENT_TEST Test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnderwentTest {
    pub id: Option<i64>,
    pub test_id: String,
    pub performed_date: Option<String>,
}

impl UnderwentTest {
    pub fn to(test: &Test) -> Self {
        Self {
            test_id: test.test_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for UnderwentTest {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Test::schema().label, &self.test_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("performedDate", &self.performed_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            test_id: edge.target_id.clone(),
            performed_date: get_opt(&edge.properties, "performedDate"),
        })
    }
}

/// Patient ADMITTED_TO Hospital.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmittedTo {
    pub id: Option<i64>,
    pub hospital_id: String,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
}

impl AdmittedTo {
    pub fn to(hospital: &Hospital) -> Self {
        Self {
            hospital_id: hospital.hospital_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for AdmittedTo {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Hospital::schema().label, &self.hospital_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[
            ("admissionDate", &self.admission_date),
            ("dischargeDate", &self.discharge_date),
        ])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            hospital_id: edge.target_id.clone(),
            admission_date: get_opt(&edge.properties, "admissionDate"),
            discharge_date: get_opt(&edge.properties, "dischargeDate"),
        })
    }
}

/// Patient CARED_FOR_BY Doctor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaredForBy {
    pub id: Option<i64>,
    pub doctor_id: String,
    pub start_date: Option<String>,
}

impl CaredForBy {
    pub fn to(doctor: &Doctor) -> Self {
        Self {
            doctor_id: doctor.doctor_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for CaredForBy {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Doctor::schema().label, &self.doctor_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("startDate", &self.start_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            doctor_id: edge.target_id.clone(),
            start_date: get_opt(&edge.properties, "startDate"),
        })
    }
}

/// Doctor PRACTICES_AT Hospital.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PracticesAt {
    pub id: Option<i64>,
    pub hospital_id: String,
    pub start_date: Option<String>,
}

impl PracticesAt {
    pub fn to(hospital: &Hospital) -> Self {
        Self {
            hospital_id: hospital.hospital_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for PracticesAt {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Hospital::schema().label, &self.hospital_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("startDate", &self.start_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            hospital_id: edge.target_id.clone(),
            start_date: get_opt(&edge.properties, "startDate"),
        })
    }
}

/// Doctor PERFORMED Treatment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Performed {
    pub id: Option<i64>,
    pub treatment_id: String,
    pub performed_date: Option<String>,
}

impl Performed {
    pub fn to(treatment: &Treatment) -> Self {
        Self {
            treatment_id: treatment.treatment_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for Performed {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Treatment::schema().label, &self.treatment_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("performedDate", &self.performed_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            treatment_id: edge.target_id.clone(),
            performed_date: get_opt(&edge.properties, "performedDate"),
        })
    }
}

/// Doctor ORDERED Test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ordered {
    pub id: Option<i64>,
    pub test_id: String,
    pub ordered_date: Option<String>,
}

impl Ordered {
    pub fn to(test: &Test) -> Self {
        Self {
            test_id: test.test_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for Ordered {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Test::schema().label, &self.test_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("orderedDate", &self.ordered_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            test_id: edge.target_id.clone(),
            ordered_date: get_opt(&edge.properties, "orderedDate"),
        })
    }
}

/// Doctor PRESCRIBED Medication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prescribed {
    pub id: Option<i64>,
    pub medication_id: String,
    pub prescribed_date: Option<String>,
}

impl Prescribed {
    pub fn to(medication: &Medication) -> Self {
        Self {
            medication_id: medication.medication_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for Prescribed {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Medication::schema().label, &self.medication_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("prescribedDate", &self.prescribed_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            medication_id: edge.target_id.clone(),
            prescribed_date: get_opt(&edge.properties, "prescribedDate"),
        })
    }
}

/// Doctor CONSULTED Patient.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Consulted {
    pub id: Option<i64>,
    pub patient_id: String,
    pub consultation_date: Option<String>,
}

impl Consulted {
    pub fn to(patient: &Patient) -> Self {
        Self {
            patient_id: patient.patient_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for Consulted {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Patient::schema().label, &self.patient_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("consultationDate", &self.consultation_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            patient_id: edge.target_id.clone(),
            consultation_date: get_opt(&edge.properties, "consultationDate"),
        })
    }
}

/// Test RESULTED_IN Diagnosis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultedIn {
    pub id: Option<i64>,
    pub diagnosis_id: String,
    pub result_impact: Option<String>,
}

impl ResultedIn {
    pub fn to(diagnosis: &Diagnosis) -> Self {
        Self {
            diagnosis_id: diagnosis.diagnosis_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for ResultedIn {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Diagnosis::schema().label, &self.diagnosis_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("resultImpact", &self.result_impact)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            diagnosis_id: edge.target_id.clone(),
            result_impact: get_opt(&edge.properties, "resultImpact"),
        })
    }
}

/// Test PERFORMED_AT Hospital.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerformedAt {
    pub id: Option<i64>,
    pub hospital_id: String,
    pub performed_date: Option<String>,
}

impl PerformedAt {
    pub fn to(hospital: &Hospital) -> Self {
        Self {
            hospital_id: hospital.hospital_id.clone(),
            ..Self::default()
        }
    }
}

impl Relationship for PerformedAt {
    fn edge_id(&self) -> Option<i64> {
        self.id
    }

    fn target(&self) -> (&'static str, &str) {
        (Hospital::schema().label, &self.hospital_id)
    }

    fn properties(&self) -> PropertyMap {
        props(&[("performedDate", &self.performed_date)])
    }

    fn from_edge(edge: &Edge) -> GraphResult<Self> {
        Ok(Self {
            id: edge.id,
            hospital_id: edge.target_id.clone(),
            performed_date: get_opt(&edge.properties, "performedDate"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_up_target_comes_from_label() {
        let edge = Edge::new("FOLLOWS_UP", DIAGNOSIS_LABEL, "diag1").with_id(Some(3));
        let follow_up = FollowsUp::from_edge(&edge).unwrap();
        assert_eq!(follow_up.target, FollowUpTarget::Diagnosis("diag1".into()));
        assert_eq!(follow_up.target(), (DIAGNOSIS_LABEL, "diag1"));

        let edge = Edge::new("FOLLOWS_UP", "Hospital", "hosp1");
        assert!(matches!(
            FollowsUp::from_edge(&edge),
            Err(GraphError::UnexpectedTarget { .. })
        ));
    }

    #[test]
    fn absent_edge_properties_are_not_written() {
        let rel = ReceivesTreatment {
            treatment_id: "treat1".into(),
            start_date: Some("2024-01-21".into()),
            ..ReceivesTreatment::default()
        };
        let properties = rel.properties();
        assert_eq!(properties.len(), 1);
        assert!(properties.contains_key("startDate"));
    }

    #[test]
    fn link_targets_entity_label() {
        let link: Link<Hospital> = Link::new("hosp1");
        assert_eq!(link.target(), ("Hospital", "hosp1"));
        assert_eq!(link.edge_id(), None);
    }

    #[test]
    fn edge_properties_survive_conversion() {
        let mut properties = PropertyMap::new();
        properties.insert("appointmentDate".into(), "2024-01-20".into());
        properties.insert("status".into(), "Completed".into());
        let edge = Edge::new("HAS_APPOINTMENT", "Appointment", "appt1")
            .with_id(Some(11))
            .with_properties(properties.clone());

        let rel = HasAppointment::from_edge(&edge).unwrap();
        assert_eq!(rel.id, Some(11));
        assert_eq!(rel.appointment_type, None);
        assert_eq!(rel.properties(), properties);
    }
}
