//! Flat external representations of the domain entities.
//!
//! Each DTO copies a fixed subset of its entity's scalar fields and drops every relationship.
//! Conversions are `From<&Entity>` impls; [`to_dto`] lifts them over `Option` so an absent
//! entity maps to an absent DTO.

use caregraph_core::model::{
    Alert, Appointment, Diagnosis, Doctor, Hospital, LeadsTo, Medication, Patient, Test,
    Treatment,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maps an optional entity to an optional DTO.
pub fn to_dto<'a, E, D>(entity: Option<&'a E>) -> Option<D>
where
    D: From<&'a E>,
{
    entity.map(D::from)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub patient_id: String,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

impl From<&Patient> for PatientDto {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: patient.patient_id.clone(),
            name: patient.name.clone(),
            dob: patient.dob.clone(),
            gender: patient.gender.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDto {
    pub doctor_id: String,
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub contact_number: Option<String>,
    pub qualifications: Option<String>,
    pub email: Option<String>,
}

impl From<&Doctor> for DoctorDto {
    fn from(doctor: &Doctor) -> Self {
        Self {
            doctor_id: doctor.doctor_id.clone(),
            name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            contact_number: doctor.contact_number.clone(),
            qualifications: doctor.qualifications.clone(),
            email: doctor.email.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalDto {
    pub hospital_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl From<&Hospital> for HospitalDto {
    fn from(hospital: &Hospital) -> Self {
        Self {
            hospital_id: hospital.hospital_id.clone(),
            name: hospital.name.clone(),
            location: hospital.location.clone(),
            contact_number: hospital.contact_number.clone(),
            kind: hospital.kind.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub appointment_id: String,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl From<&Appointment> for AppointmentDto {
    fn from(appointment: &Appointment) -> Self {
        Self {
            appointment_id: appointment.appointment_id.clone(),
            date: appointment.date.clone(),
            kind: appointment.kind.clone(),
            status: appointment.status.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisDto {
    pub diagnosis_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub diagnosed_date: Option<String>,
}

impl From<&Diagnosis> for DiagnosisDto {
    fn from(diagnosis: &Diagnosis) -> Self {
        Self {
            diagnosis_id: diagnosis.diagnosis_id.clone(),
            name: diagnosis.name.clone(),
            description: diagnosis.description.clone(),
            diagnosed_date: diagnosis.diagnosed_date.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentDto {
    pub treatment_id: String,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl From<&Treatment> for TreatmentDto {
    fn from(treatment: &Treatment) -> Self {
        Self {
            treatment_id: treatment.treatment_id.clone(),
            name: treatment.name.clone(),
            start_date: treatment.start_date.clone(),
            end_date: treatment.end_date.clone(),
            status: treatment.status.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDto {
    pub medication_id: String,
    pub drug_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_date: Option<String>,
    pub adherence: Option<String>,
}

impl From<&Medication> for MedicationDto {
    fn from(medication: &Medication) -> Self {
        Self {
            medication_id: medication.medication_id.clone(),
            drug_name: medication.drug_name.clone(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
            prescribed_date: medication.prescribed_date.clone(),
            adherence: medication.adherence.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestDto {
    pub test_id: String,
    pub name: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

impl From<&Test> for TestDto {
    fn from(test: &Test) -> Self {
        Self {
            test_id: test.test_id.clone(),
            name: test.name.clone(),
            result: test.result.clone(),
            date: test.date.clone(),
            status: test.status.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub alert_id: String,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub timestamp: Option<String>,
    pub resolved: bool,
}

impl From<&Alert> for AlertDto {
    fn from(alert: &Alert) -> Self {
        Self {
            alert_id: alert.alert_id.clone(),
            message: alert.message.clone(),
            kind: alert.kind.clone(),
            timestamp: alert.timestamp.clone(),
            resolved: alert.resolved,
        }
    }
}

/// A LEADS_TO edge, optionally enriched with the treatment it points at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadsToDto {
    pub id: Option<i64>,
    pub treatment_id: Option<String>,
    pub treatment_name: Option<String>,
}

impl LeadsToDto {
    /// Builds the DTO, taking the treatment name from `treatment` when it is supplied.
    pub fn with_treatment(leads_to: &LeadsTo, treatment: Option<&Treatment>) -> Self {
        Self {
            id: leads_to.id,
            treatment_id: Some(leads_to.target_id.clone()),
            treatment_name: treatment.and_then(|t| t.name.clone()),
        }
    }
}

impl From<&LeadsTo> for LeadsToDto {
    fn from(leads_to: &LeadsTo) -> Self {
        Self::with_treatment(leads_to, None)
    }
}
