//! Appointment models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ConsultationType, Mutuelle, PaymentMethod};

/// Confirmation status of an appointment.
///
/// The first seven variants are the scheduling states; `NonPaye` and
/// `Paye` are payment-status literals the billing view writes into the
/// same field, so they must be representable to keep old stores readable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "-")]
    Unset,
    #[serde(rename = "En attente")]
    EnAttente,
    #[serde(rename = "Validé")]
    Valide,
    #[serde(rename = "Annulé")]
    Annule,
    #[serde(rename = "Reporté")]
    Reporte,
    #[serde(rename = "Absent")]
    Absent,
    #[serde(rename = "Confirmé")]
    Confirme,
    #[serde(rename = "Non payé")]
    NonPaye,
    #[serde(rename = "Payé")]
    Paye,
}

impl AppointmentStatus {
    /// Wire/display label.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Unset => "-",
            AppointmentStatus::EnAttente => "En attente",
            AppointmentStatus::Valide => "Validé",
            AppointmentStatus::Annule => "Annulé",
            AppointmentStatus::Reporte => "Reporté",
            AppointmentStatus::Absent => "Absent",
            AppointmentStatus::Confirme => "Confirmé",
            AppointmentStatus::NonPaye => "Non payé",
            AppointmentStatus::Paye => "Payé",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who an appointment belongs to, resolved once from the raw record.
///
/// Slots booked for a registered patient carry `patient_id`; slots booked
/// for a walk-in who has no Patient record yet carry raw name fields and,
/// once validated, a provisionally reserved patient number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientRef<'a> {
    /// Owned by a registered patient
    Linked { patient_id: &'a str },
    /// Not yet registered; identified by name
    Provisional {
        nom: &'a str,
        prenom: &'a str,
        telephone: Option<&'a str>,
    },
    /// No identity at all (lunch breaks, free-text slots)
    Unidentified,
}

/// A scheduled slot.
///
/// Field names follow the persisted JSON shape of the legacy store
/// (`patientId`, `ficheNumber`, `paymentMethod`, `numeroPatient`, `type`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Opaque unique id, generated locally
    pub id: String,
    /// ISO-8601 timestamp of the slot
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    /// Raw family name, for not-yet-registered patients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    /// Raw given name, for not-yet-registered patients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    /// Display name for registered patients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    /// Amount as a comma-decimal string (e.g. `150,00`)
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutuelle: Option<Mutuelle>,
    /// Medical file number, format `FXX-XXXX`; mandatory and globally
    /// unique when the appointment is validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiche_number: Option<String>,
    /// Consultation category or free text
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<ConsultationType>,
    /// Reserved patient number when no Patient record exists yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_patient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    /// Create a new appointment at the given ISO-8601 time, in the
    /// default `En attente` state.
    pub fn new(time: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            time: time.to_string(),
            patient_id: None,
            nom: None,
            prenom: None,
            telephone: None,
            patient: None,
            status: AppointmentStatus::EnAttente,
            amount: String::new(),
            payment_method: PaymentMethod::Aucun,
            mutuelle: None,
            fiche_number: None,
            type_: None,
            numero_patient: None,
            notes: None,
        }
    }

    /// Resolve the ownership link once. `patient_id` wins over raw name
    /// fields when both are present.
    pub fn patient_ref(&self) -> PatientRef<'_> {
        if let Some(id) = self.patient_id.as_deref() {
            return PatientRef::Linked { patient_id: id };
        }
        match (self.nom.as_deref(), self.prenom.as_deref()) {
            (Some(nom), Some(prenom)) => PatientRef::Provisional {
                nom,
                prenom,
                telephone: self.telephone.as_deref(),
            },
            _ => PatientRef::Unidentified,
        }
    }

    /// Parsed slot time. Unparsable timestamps never match any time
    /// comparison, mirroring the legacy invalid-date semantics.
    pub fn parsed_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Calendar day of the slot, if the timestamp parses.
    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed_time().map(|t| t.date_naive())
    }

    /// The fiche number, treating the empty string as absent.
    pub fn fiche(&self) -> Option<&str> {
        self.fiche_number.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether this slot falls on the same calendar day as `other`.
    pub fn same_day_as(&self, other: &Appointment) -> bool {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
