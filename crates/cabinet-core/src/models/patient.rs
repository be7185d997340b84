//! Patient models.

use serde::{Deserialize, Serialize};

/// Supplementary health-insurance coverage attached to a patient or visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Mutuelle {
    /// Whether the patient is covered
    pub active: bool,
    /// Insurer name (e.g. "CNSS", "RMA")
    pub nom: String,
}

/// A patient record.
///
/// Field names follow the persisted JSON shape of the legacy store
/// (`numeroPatient`, `dateNaissance`, ...). Patients are never physically
/// deleted; they remain as historical records even when all of their
/// appointments are removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Opaque unique id, generated locally
    pub id: String,
    /// Clinic-assigned patient number, format `P####`
    pub numero_patient: String,
    /// Family name
    pub nom: String,
    /// Given name
    pub prenom: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub ville: String,
    /// National id card number
    #[serde(default)]
    pub cin: String,
    #[serde(default)]
    pub date_naissance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutuelle: Option<Mutuelle>,
    /// Free-text medical history entries
    #[serde(default)]
    pub antecedents: Vec<String>,
}

impl Patient {
    /// Create a new patient with the required identity fields.
    pub fn new(nom: &str, prenom: &str, numero_patient: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            numero_patient: numero_patient.to_string(),
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            telephone: String::new(),
            email: None,
            ville: String::new(),
            cin: String::new(),
            date_naissance: String::new(),
            mutuelle: None,
            antecedents: Vec::new(),
        }
    }

    /// Case-insensitive identity key used for deduplication and matching.
    pub fn name_key(&self) -> String {
        format!("{} {}", self.nom.to_lowercase(), self.prenom.to_lowercase())
    }

    /// Numeric suffix of the patient number (`P0012` -> 12), if it parses.
    pub fn numero_suffix(&self) -> Option<u32> {
        self.numero_patient.get(1..).and_then(|s| s.parse().ok())
    }

    /// Whether this patient has active supplementary insurance.
    pub fn has_mutuelle(&self) -> bool {
        self.mutuelle.as_ref().map(|m| m.active).unwrap_or(false)
    }
}

/// A patient together with statistics derived from the appointment list.
///
/// Derived on read, never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPatient {
    #[serde(flatten)]
    pub patient: Patient,
    /// Count of validated consultations
    pub nombre_consultations: usize,
    /// Most recent visit of any status, `dd/MM/yyyy`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derniere_consultation: Option<String>,
    /// Earliest upcoming visit, `dd/MM/yyyy HH:mm`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prochain_rdv: Option<String>,
}
