//! Payment and consultation-type models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payment status labels shown in the billing and dashboard views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    #[serde(rename = "Payé")]
    Paye,
    #[serde(rename = "Non payé")]
    NonPaye,
    #[serde(rename = "En attente")]
    EnAttente,
    #[serde(rename = "Validé")]
    Valide,
    #[serde(rename = "Confirmé")]
    Confirme,
}

impl PaymentStatus {
    /// Wire/display label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paye => "Payé",
            PaymentStatus::NonPaye => "Non payé",
            PaymentStatus::EnAttente => "En attente",
            PaymentStatus::Valide => "Validé",
            PaymentStatus::Confirme => "Confirmé",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepted payment methods. `Aucun` is stored as `-` (no method chosen);
/// legacy records may carry an empty string, which reads back as `Aucun`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[serde(rename = "Carte Bancaire")]
    CarteBancaire,
    #[serde(rename = "Espèces")]
    Especes,
    #[serde(rename = "Virement")]
    Virement,
    #[serde(rename = "Chèque")]
    Cheque,
    #[default]
    #[serde(rename = "-", alias = "")]
    Aucun,
}

impl PaymentMethod {
    /// Whether no method has been chosen.
    pub fn is_none(&self) -> bool {
        matches!(self, PaymentMethod::Aucun)
    }

    /// Wire/display label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CarteBancaire => "Carte Bancaire",
            PaymentMethod::Especes => "Espèces",
            PaymentMethod::Virement => "Virement",
            PaymentMethod::Cheque => "Chèque",
            PaymentMethod::Aucun => "-",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Consultation category. The last variant carries free text so that
/// legacy values such as `Autre - Bilan` or `PAUSE_DEJEUNER` round-trip
/// through the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationType {
    Suivi,
    Therapie,
    NouvelleConsultation,
    Visio,
    Delegue,
    Gratuite,
    Controle,
    NonPaye,
    Clinique,
    Autre,
    Libre(String),
}

/// The selectable consultation categories, in menu order.
pub const CONSULTATION_TYPES: [ConsultationType; 10] = [
    ConsultationType::Suivi,
    ConsultationType::Therapie,
    ConsultationType::NouvelleConsultation,
    ConsultationType::Visio,
    ConsultationType::Delegue,
    ConsultationType::Gratuite,
    ConsultationType::Controle,
    ConsultationType::NonPaye,
    ConsultationType::Clinique,
    ConsultationType::Autre,
];

impl ConsultationType {
    /// Wire/display label.
    pub fn label(&self) -> &str {
        match self {
            ConsultationType::Suivi => "Suivi",
            ConsultationType::Therapie => "Thérapie",
            ConsultationType::NouvelleConsultation => "Nouvelle consultation",
            ConsultationType::Visio => "Visio",
            ConsultationType::Delegue => "Délégué",
            ConsultationType::Gratuite => "Gratuité",
            ConsultationType::Controle => "Contrôle",
            ConsultationType::NonPaye => "Non payé",
            ConsultationType::Clinique => "Clinique",
            ConsultationType::Autre => "Autre",
            ConsultationType::Libre(text) => text,
        }
    }

    /// Build the "Autre - <précision>" form used for custom categories.
    pub fn autre_avec(text: &str) -> Self {
        ConsultationType::Libre(format!("Autre - {}", text))
    }

    /// The custom précision of an "Autre - ..." value, if any.
    pub fn custom_label(&self) -> Option<&str> {
        match self {
            ConsultationType::Libre(text) => {
                text.strip_prefix("Autre - ").map(|s| s.trim())
            }
            _ => None,
        }
    }
}

impl From<&str> for ConsultationType {
    fn from(s: &str) -> Self {
        match s {
            "Suivi" => ConsultationType::Suivi,
            "Thérapie" => ConsultationType::Therapie,
            "Nouvelle consultation" => ConsultationType::NouvelleConsultation,
            "Visio" => ConsultationType::Visio,
            "Délégué" => ConsultationType::Delegue,
            "Gratuité" => ConsultationType::Gratuite,
            "Contrôle" => ConsultationType::Controle,
            "Non payé" => ConsultationType::NonPaye,
            "Clinique" => ConsultationType::Clinique,
            "Autre" => ConsultationType::Autre,
            other => ConsultationType::Libre(other.to_string()),
        }
    }
}

impl fmt::Display for ConsultationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ConsultationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ConsultationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ConsultationType::from(s.as_str()))
    }
}

/// Payment details recorded for a single appointment, keyed by
/// appointment id in the payment store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentData {
    /// Amount as a comma-decimal string (e.g. `150,00`)
    pub amount: String,
    pub status: PaymentStatus,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: PaymentMethod,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<ConsultationType>,
}

/// Parse a comma-decimal amount string. Anything that does not parse
/// (including the empty string) counts as zero.
pub fn parse_amount(amount: &str) -> f64 {
    amount.trim().replace(',', ".").parse().unwrap_or(0.0)
}
