//! Patient deduplication and enrichment.
//!
//! Historical imports left duplicate patient records behind (same person,
//! several numbers). The listing collapses them by case-insensitive name,
//! keeping the earliest-registered number, and decorates each survivor
//! with visit statistics computed from the appointment list.

use chrono::{DateTime, Utc};

use crate::models::{
    Appointment, AppointmentStatus, EnrichedPatient, Patient, PatientRef,
};

/// Collapse duplicate patient records.
///
/// Patients are grouped by case-insensitive `(nom, prenom)`; per group the
/// record with the lowest numeric number suffix wins (earliest
/// registered). A suffix that does not parse never displaces the
/// incumbent. Output preserves first-occurrence order.
pub fn dedupe(patients: &[Patient]) -> Vec<Patient> {
    let mut unique: Vec<Patient> = Vec::new();

    for patient in patients {
        let key = patient.name_key();
        match unique.iter_mut().find(|p| p.name_key() == key) {
            None => unique.push(patient.clone()),
            Some(existing) => {
                if let (Some(candidate), Some(incumbent)) =
                    (patient.numero_suffix(), existing.numero_suffix())
                {
                    if candidate < incumbent {
                        *existing = patient.clone();
                    }
                }
            }
        }
    }

    unique
}

/// Whether an appointment belongs to the given patient, by ownership link
/// or case-insensitive name match.
fn belongs_to(apt: &Appointment, patient: &Patient) -> bool {
    match apt.patient_ref() {
        PatientRef::Linked { patient_id } => patient_id == patient.id,
        PatientRef::Provisional { nom, prenom, .. } => {
            nom.to_lowercase() == patient.nom.to_lowercase()
                && prenom.to_lowercase() == patient.prenom.to_lowercase()
        }
        PatientRef::Unidentified => false,
    }
}

/// Compute a patient's visit statistics.
///
/// `nombre_consultations` counts validated visits;
/// `derniere_consultation` is the most recent visit of any status;
/// `prochain_rdv` is the earliest visit strictly after `now`.
pub fn enrich(
    patient: &Patient,
    appointments: &[Appointment],
    now: DateTime<Utc>,
) -> EnrichedPatient {
    let mine: Vec<&Appointment> = appointments
        .iter()
        .filter(|apt| belongs_to(apt, patient))
        .collect();

    let nombre_consultations = mine
        .iter()
        .filter(|apt| apt.status == AppointmentStatus::Valide)
        .count();

    let derniere_consultation = mine
        .iter()
        .filter_map(|apt| apt.parsed_time())
        .max()
        .map(|t| t.format("%d/%m/%Y").to_string());

    let prochain_rdv = mine
        .iter()
        .filter_map(|apt| apt.parsed_time())
        .filter(|t| *t > now)
        .min()
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string());

    EnrichedPatient {
        patient: patient.clone(),
        nombre_consultations,
        derniere_consultation,
        prochain_rdv,
    }
}
