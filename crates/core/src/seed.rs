//! Startup sample data.
//!
//! [`seed`] writes one fixed instance of every entity and of every declared relationship.
//! Targets are saved before the records that point at them, and every re-save uses the
//! value returned by the previous save so relationships are created once per run.
//!
//! The routine is not idempotent across runs: against a store that already holds the
//! sample data the nine nodes are upserted in place and every relationship gains a second
//! copy.

use crate::model::{
    AdmittedTo, Alert, Appointment, CaredForBy, Consulted, Diagnosis, Doctor, FollowsUp,
    HasAppointment, HasDiagnosis, Hospital, Link, Medication, Ordered, Patient, Performed,
    PerformedAt, PracticesAt, Prescribed, ReceivesTreatment, ResultedIn, TakesMedication, Test,
    Treatment, UnderwentTest,
};
use crate::repositories::Repositories;
use crate::GraphResult;

/// The entities as they stand after seeding, with relationship ids assigned.
#[derive(Clone, Debug)]
pub struct SampleRecords {
    pub doctor: Doctor,
    pub hospital: Hospital,
    pub diagnosis: Diagnosis,
    pub treatment: Treatment,
    pub medication: Medication,
    pub appointment: Appointment,
    pub test: Test,
    pub alert: Alert,
    pub patient: Patient,
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// Inserts the sample graph. Any persistence failure aborts the run.
pub async fn seed(repos: &Repositories) -> GraphResult<SampleRecords> {
    let hospital = repos
        .hospitals
        .save(Hospital {
            hospital_id: "hosp1".into(),
            name: text("City General Hospital"),
            location: text("Colombo"),
            contact_number: text("011-1234567"),
            kind: text("General"),
        })
        .await?;

    let diagnosis = repos
        .diagnoses
        .save(Diagnosis {
            diagnosis_id: "diag1".into(),
            name: text("Hypertension"),
            description: text("High blood pressure"),
            diagnosed_date: text("2024-01-15"),
            ..Diagnosis::default()
        })
        .await?;

    let treatment = repos
        .treatments
        .save(Treatment {
            treatment_id: "treat1".into(),
            name: text("Hypertension Management"),
            start_date: text("2024-01-21"),
            end_date: text("2024-06-21"),
            status: text("Ongoing"),
            ..Treatment::default()
        })
        .await?;

    let medication = repos
        .medications
        .save(Medication {
            medication_id: "med1".into(),
            drug_name: text("Lisinopril"),
            dosage: text("10mg"),
            frequency: text("Once daily"),
            prescribed_date: text("2024-01-20"),
            adherence: text("Compliant"),
            ..Medication::default()
        })
        .await?;

    let test = repos
        .tests
        .save(Test {
            test_id: "test1".into(),
            name: text("Blood Pressure Test"),
            result: text("140/90"),
            date: text("2024-01-20"),
            status: text("Completed"),
            ..Test::default()
        })
        .await?;

    let doctor = repos
        .doctors
        .save(Doctor {
            doctor_id: "doc1".into(),
            name: text("Dr. Jane Smith"),
            specialty: text("General Physician"),
            contact_number: text("1234567890"),
            qualifications: text("MBBS, MD"),
            email: text("jane.smith@example.com"),
            ..Doctor::default()
        })
        .await?;

    let alert = repos
        .alerts
        .save(Alert {
            alert_id: "alert1".into(),
            message: text("Patient missed medication dose"),
            kind: text("MissedMedication"),
            timestamp: text("2024-01-22T09:00:00Z"),
            resolved: false,
            doctor: Some(Link::to(&doctor)),
            ..Alert::default()
        })
        .await?;

    let appointment = repos
        .appointments
        .save(Appointment {
            appointment_id: "appt1".into(),
            date: text("2024-01-20"),
            kind: text("Consultation"),
            status: text("Completed"),
            doctor: Some(Link::to(&doctor)),
            hospital: Some(Link::to(&hospital)),
            diagnoses: vec![Link::to(&diagnosis)],
            tests: vec![Link::to(&test)],
            follow_ups: vec![FollowsUp::treatment(&treatment)],
        })
        .await?;

    let mut diagnosis = diagnosis;
    diagnosis.leads_to.push(Link::to(&treatment));
    let diagnosis = repos.diagnoses.save(diagnosis).await?;

    let mut treatment = treatment;
    treatment.medications.push(Link::to(&medication));
    treatment.for_diagnoses.push(Link::to(&diagnosis));
    let own = Link::to(&treatment);
    treatment.for_treatments.push(own);
    let treatment = repos.treatments.save(treatment).await?;

    let mut medication = medication;
    medication.diagnosis = Some(Link::to(&diagnosis));
    medication.for_treatments.push(Link::to(&treatment));
    let medication = repos.medications.save(medication).await?;

    let mut test = test;
    test.resulted_in.push(ResultedIn {
        result_impact: text("Confirmed hypertension"),
        ..ResultedIn::to(&diagnosis)
    });
    test.performed_at.push(PerformedAt {
        performed_date: text("2024-01-20"),
        ..PerformedAt::to(&hospital)
    });
    let test = repos.tests.save(test).await?;

    let patient = repos
        .patients
        .save(Patient {
            patient_id: "pat1".into(),
            name: text("John Doe"),
            dob: text("1980-05-10"),
            gender: text("Male"),
            contact_number: text("077-1234567"),
            address: text("123 Main St, Colombo"),
            blood_group: text("A+"),
            insurance_provider: text("Ceylinco"),
            current_status: text("Active"),
            diagnoses: vec![HasDiagnosis {
                diagnosed_date: text("2024-01-15"),
                ..HasDiagnosis::to(&diagnosis)
            }],
            treatments: vec![ReceivesTreatment {
                start_date: text("2024-01-21"),
                end_date: text("2024-06-21"),
                ..ReceivesTreatment::to(&treatment)
            }],
            medications: vec![TakesMedication {
                prescribed_date: text("2024-01-20"),
                adherence: text("Compliant"),
                ..TakesMedication::to(&medication)
            }],
            appointments: vec![HasAppointment {
                appointment_date: text("2024-01-20"),
                appointment_type: text("Consultation"),
                status: text("Completed"),
                ..HasAppointment::to(&appointment)
            }],
            tests: vec![UnderwentTest {
                performed_date: text("2024-01-20"),
                ..UnderwentTest::to(&test)
            }],
            admissions: vec![AdmittedTo {
                admission_date: text("2024-01-19"),
                discharge_date: text("2024-01-21"),
                ..AdmittedTo::to(&hospital)
            }],
            care_team: vec![CaredForBy {
                start_date: text("2024-01-15"),
                ..CaredForBy::to(&doctor)
            }],
        })
        .await?;

    let mut alert = alert;
    alert.patient = Some(Link::to(&patient));
    let alert = repos.alerts.save(alert).await?;

    let mut doctor = doctor;
    doctor.practices_at.push(PracticesAt {
        start_date: text("2024-01-01"),
        ..PracticesAt::to(&hospital)
    });
    doctor.performed.push(Performed {
        performed_date: text("2024-01-21"),
        ..Performed::to(&treatment)
    });
    doctor.ordered.push(Ordered {
        ordered_date: text("2024-01-20"),
        ..Ordered::to(&test)
    });
    doctor.prescribed.push(Prescribed {
        prescribed_date: text("2024-01-20"),
        ..Prescribed::to(&medication)
    });
    doctor.consulted.push(Consulted {
        consultation_date: text("2024-01-20"),
        ..Consulted::to(&patient)
    });
    let doctor = repos.doctors.save(doctor).await?;

    tracing::info!(
        "Sample data initialized: all 9 ontology entities (including Alert) and their relationships created in {}",
        repos.store().backend_name()
    );

    Ok(SampleRecords {
        doctor,
        hospital,
        diagnosis,
        treatment,
        medication,
        appointment,
        test,
        alert,
        patient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, MemoryGraphStore};
    use crate::model::{FollowUpTarget, GraphEntity};
    use std::sync::Arc;

    fn repositories() -> Repositories {
        Repositories::new(Arc::new(MemoryGraphStore::new()))
    }

    #[tokio::test]
    async fn seeds_one_of_everything() {
        let repos = repositories();
        seed(&repos).await.expect("seed should succeed");

        let stats = repos.stats().await.unwrap();
        for (label, count) in &stats.nodes {
            assert_eq!(*count, 1, "expected one {label} node");
        }
        for (relationship, count) in &stats.edges {
            assert_eq!(*count, 1, "expected one {relationship} edge");
        }
        assert_eq!(stats.total_nodes(), 9);
    }

    #[tokio::test]
    async fn second_run_duplicates_relationships_only() {
        let repos = repositories();
        seed(&repos).await.unwrap();
        seed(&repos).await.unwrap();

        let stats = repos.stats().await.unwrap();
        assert!(stats.nodes.values().all(|count| *count == 1));
        assert!(stats.edges.values().all(|count| *count == 2));
    }

    #[tokio::test]
    async fn sample_values_are_stored() {
        let repos = repositories();
        let sample = seed(&repos).await.unwrap();

        let patient = repos.patients.find_by_id("pat1").await.unwrap().unwrap();
        assert_eq!(patient, sample.patient);
        assert_eq!(patient.name.as_deref(), Some("John Doe"));
        assert_eq!(patient.care_team[0].doctor_id, "doc1");
        assert_eq!(
            patient.admissions[0].discharge_date.as_deref(),
            Some("2024-01-21")
        );

        let alert = repos.alerts.find_by_id("alert1").await.unwrap().unwrap();
        assert!(!alert.resolved);
        assert_eq!(alert.patient.map(|l| l.target_id).as_deref(), Some("pat1"));
        assert_eq!(alert.doctor.map(|l| l.target_id).as_deref(), Some("doc1"));

        let appointment = repos.appointments.find_by_id("appt1").await.unwrap().unwrap();
        assert_eq!(
            appointment.follow_ups[0].target,
            FollowUpTarget::Treatment("treat1".into())
        );

        let doctor = repos.doctors.find_by_id("doc1").await.unwrap().unwrap();
        assert_eq!(doctor.consulted[0].patient_id, "pat1");
        assert_eq!(doctor, sample.doctor);
    }

    #[tokio::test]
    async fn second_run_keeps_single_links_readable() {
        let repos = repositories();
        let first = seed(&repos).await.unwrap();
        seed(&repos).await.unwrap();

        let alert = repos.alerts.find_by_id("alert1").await.unwrap().unwrap();
        assert_eq!(alert.doctor, first.alert.doctor);
        assert_eq!(
            repos
                .store()
                .count_edges(Alert::schema(), "FOR_DOCTOR")
                .await
                .unwrap(),
            2
        );
    }
}
