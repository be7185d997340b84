//! Billing rows for validated consultations, with CSV/JSON export.

use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus, Mutuelle, Patient};
use crate::reconcile;

/// Insurers accepted by the clinic, in menu order.
pub const MUTUELLES: [&str; 10] = [
    "RMA",
    "CNSS",
    "CNOPS",
    "SAHAM",
    "AXA",
    "MCMA",
    "Allianz",
    "Sanad",
    "MGPAP",
    "AtlantaSanad",
];

/// One row of the billing table: a validated consultation with its
/// resolved patient details and derived payment status.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BillingEntry {
    /// Source appointment id
    pub appointment_id: String,
    /// Patient number: patient record, else slot reservation, else `-`
    pub patient_number: String,
    pub patient_name: String,
    /// Consultation date, `dd/MM/yyyy`
    pub date: String,
    /// Billed amount, comma-decimal string
    pub amount: String,
    /// Amount of the patient's previous consultation, if any
    pub last_consult_amount: Option<String>,
    pub payment_method: String,
    pub mutuelle: Option<Mutuelle>,
    /// Derived payment-status label
    pub status: String,
    /// Consultation category label
    pub consultation_type: String,
}

fn patient_display_name(apt: &Appointment, patient: Option<&Patient>) -> String {
    if let Some(p) = patient {
        return format!("{} {}", p.nom, p.prenom);
    }
    match (apt.nom.as_deref(), apt.prenom.as_deref()) {
        (Some(nom), Some(prenom)) => format!("{} {}", nom, prenom),
        _ => "Patient non spécifié".to_string(),
    }
}

/// Amount of the most recent other consultation of the same patient.
fn last_consult_amount(apt: &Appointment, appointments: &[Appointment]) -> Option<String> {
    let patient_id = apt.patient_id.as_deref()?;
    appointments
        .iter()
        .filter(|other| {
            other.id != apt.id && other.patient_id.as_deref() == Some(patient_id)
        })
        .max_by_key(|other| other.parsed_time())
        .map(|other| other.amount.clone())
}

/// Build the billing rows: every validated consultation, newest first.
pub fn billing_entries(appointments: &[Appointment], patients: &[Patient]) -> Vec<BillingEntry> {
    let mut validated: Vec<&Appointment> = appointments
        .iter()
        .filter(|apt| apt.status == AppointmentStatus::Valide)
        .collect();
    validated.sort_by_key(|apt| std::cmp::Reverse(apt.parsed_time()));

    validated
        .into_iter()
        .map(|apt| {
            let patient = apt
                .patient_id
                .as_deref()
                .and_then(|id| patients.iter().find(|p| p.id == id));

            let patient_number = patient
                .map(|p| p.numero_patient.clone())
                .or_else(|| apt.numero_patient.clone())
                .unwrap_or_else(|| "-".to_string());

            let date = apt
                .parsed_time()
                .map(|t| t.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".to_string());

            BillingEntry {
                appointment_id: apt.id.clone(),
                patient_number,
                patient_name: patient_display_name(apt, patient),
                date,
                amount: if apt.amount.is_empty() {
                    "0,00".to_string()
                } else {
                    apt.amount.clone()
                },
                last_consult_amount: last_consult_amount(apt, appointments),
                payment_method: apt.payment_method.label().to_string(),
                mutuelle: apt
                    .mutuelle
                    .clone()
                    .or_else(|| patient.and_then(|p| p.mutuelle.clone())),
                status: reconcile::display_status(apt).label().to_string(),
                consultation_type: apt
                    .type_
                    .as_ref()
                    .map(|t| t.label().to_string())
                    .unwrap_or_else(|| "Autre".to_string()),
            }
        })
        .collect()
}

/// A billing export batch.
#[derive(Debug, Clone, Serialize)]
pub struct BillingExport {
    /// Export timestamp
    pub exported_at: String,
    pub entries: Vec<BillingEntry>,
    /// Number of entries covered by a mutuelle
    pub with_mutuelle: usize,
}

impl BillingExport {
    /// Build an export batch from the billing rows.
    pub fn new(entries: Vec<BillingEntry>) -> Self {
        let with_mutuelle = entries
            .iter()
            .filter(|e| e.mutuelle.as_ref().map(|m| m.active).unwrap_or(false))
            .count();
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            entries,
            with_mutuelle,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str(
            "numero_patient,patient,date,montant,dernier_montant,type_paiement,mutuelle,statut,type_consultation\n",
        );

        for entry in &self.entries {
            let mutuelle = entry
                .mutuelle
                .as_ref()
                .filter(|m| m.active)
                .map(|m| m.nom.as_str())
                .unwrap_or("-");
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&entry.patient_number),
                escape_csv(&entry.patient_name),
                escape_csv(&entry.date),
                escape_csv(&entry.amount),
                escape_csv(entry.last_consult_amount.as_deref().unwrap_or("-")),
                escape_csv(&entry.payment_method),
                escape_csv(mutuelle),
                escape_csv(&entry.status),
                escape_csv(&entry.consultation_type),
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
