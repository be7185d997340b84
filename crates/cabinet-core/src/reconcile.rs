//! Appointment status / payment-status reconciliation.
//!
//! The confirmation status and the displayed payment status live in one
//! record but answer different questions; this module keeps them
//! consistent. The displayed status is derived, never stored: it is
//! recomputed from the confirmation status, the amount and the payment
//! method on every read.

use thiserror::Error;

use crate::fiche;
use crate::models::{
    parse_amount, Appointment, AppointmentStatus, PaymentMethod, PaymentStatus,
};

/// Rejected consultation edits. All variants are recoverable: the edit is
/// dropped, prior state stays untouched, and the message is shown to the
/// user as-is.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Le numéro de fiche patient est obligatoire pour un rendez-vous validé.")]
    MissingFiche,

    #[error("Le numéro de fiche doit être au format FXX-XXXX")]
    InvalidFicheFormat,

    #[error("Ce numéro de fiche existe déjà pour un autre patient")]
    DuplicateFiche,
}

/// The editable fields of the consultation-table row.
#[derive(Debug, Clone, Default)]
pub struct ConsultationEdit {
    pub status: AppointmentStatus,
    /// Raw fiche input; normalized during validation
    pub fiche_number: String,
    /// Manually entered patient number, if any
    pub numero_patient: Option<String>,
}

/// Derive the payment status from the raw amount and payment method:
/// nothing billed yet is pending, an amount without a chosen method is
/// unpaid, an amount with a method is paid.
pub fn derive_payment_status(amount: &str, method: &PaymentMethod) -> PaymentStatus {
    if parse_amount(amount) > 0.0 {
        if method.is_none() {
            PaymentStatus::NonPaye
        } else {
            PaymentStatus::Paye
        }
    } else {
        PaymentStatus::EnAttente
    }
}

/// The payment-status label displayed for an appointment.
///
/// `Confirmé`, `En attente` and `Non payé` map directly; every other
/// confirmation status defers to the amount/method derivation.
pub fn display_status(appointment: &Appointment) -> PaymentStatus {
    match appointment.status {
        AppointmentStatus::Confirme => PaymentStatus::Confirme,
        AppointmentStatus::EnAttente => PaymentStatus::EnAttente,
        AppointmentStatus::NonPaye => PaymentStatus::NonPaye,
        AppointmentStatus::Unset
        | AppointmentStatus::Valide
        | AppointmentStatus::Annule
        | AppointmentStatus::Reporte
        | AppointmentStatus::Absent
        | AppointmentStatus::Paye => {
            derive_payment_status(&appointment.amount, &appointment.payment_method)
        }
    }
}

/// Check the fiche requirements for moving an appointment to `Validé`:
/// present, well-formed after normalization, and not used by any other
/// appointment. Returns the normalized fiche number to store.
pub fn check_fiche_for_validation(
    raw_fiche: &str,
    appointments: &[Appointment],
    editing_id: &str,
) -> Result<String, ValidationError> {
    if raw_fiche.is_empty() {
        return Err(ValidationError::MissingFiche);
    }

    let normalized = fiche::normalize(raw_fiche);
    if !fiche::validate(&normalized) {
        return Err(ValidationError::InvalidFicheFormat);
    }

    let taken = appointments
        .iter()
        .any(|apt| apt.id != editing_id && apt.fiche() == Some(normalized.as_str()));
    if taken {
        return Err(ValidationError::DuplicateFiche);
    }

    Ok(normalized)
}
