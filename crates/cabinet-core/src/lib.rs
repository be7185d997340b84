//! Cabinet-Medical Core Library
//!
//! Local-first administration core for a single-practice medical clinic:
//! appointment scheduling, patient records and billing/payment status,
//! persisted in a browser-style local key-value store.
//!
//! # Architecture
//!
//! ```text
//! UI edit event ──► Cabinet façade
//!                        │
//!        ┌───────────────┼───────────────┬───────────────┐
//!        ▼               ▼               ▼               ▼
//!    reconcile       numbering         fiche          patients
//!  status/payment   P#### pool      FXX-XXXX +       dedupe +
//!     sync          reserve/release  history          enrich
//!        │
//!        ▼
//!  in-memory collections ──► full-document JSON mirror (db::Database)
//! ```
//!
//! # Core Principle
//!
//! Every business rule is a pure function over the in-memory collections;
//! the store only mirrors whole collections after a successful edit. A
//! rejected edit commits nothing.
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed key-value store, one JSON document per collection
//! - [`models`]: Domain types (Patient, Appointment, payment types)
//! - [`numbering`]: Patient-number allocation over the reserved pool
//! - [`fiche`]: Medical-file number validation and history grouping
//! - [`reconcile`]: Status/payment-status derivation and edit validation
//! - [`patients`]: Deduplication and visit-statistics enrichment
//! - [`schedule`]: Time-slot grid and slot availability
//! - [`export`]: Billing rows and CSV/JSON export

pub mod db;
pub mod export;
pub mod fiche;
pub mod models;
pub mod numbering;
pub mod patients;
pub mod reconcile;
pub mod schedule;

// Re-export commonly used types
pub use db::{Database, StoreError};
pub use export::{billing_entries, BillingEntry, BillingExport, MUTUELLES};
pub use models::{
    Appointment, AppointmentStatus, ConsultationType, EnrichedPatient, Mutuelle, Patient,
    PatientRef, PaymentData, PaymentMethod, PaymentStatus, CONSULTATION_TYPES,
};
pub use numbering::{NumberAllocator, NumberError};
pub use reconcile::{display_status, ConsultationEdit, ValidationError};

use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use tracing::info;

// =========================================================================
// Crate Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum CabinetError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Number(#[from] NumberError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rendez-vous introuvable: {0}")]
    AppointmentNotFound(String),
}

pub type CabinetResult<T> = Result<T, CabinetError>;

/// The editable fields of a billing-table row.
#[derive(Debug, Clone)]
pub struct BillingEdit {
    /// Amount as a comma-decimal string
    pub amount: String,
    pub payment_method: PaymentMethod,
    pub mutuelle: Option<Mutuelle>,
    pub type_: Option<ConsultationType>,
    pub status: AppointmentStatus,
}

// =========================================================================
// Main API Object
// =========================================================================

/// Store-backed façade over the clinic collections.
///
/// Owns the local store and runs each edit flow end to end: load the
/// collections, apply the pure business rules, mirror the result back.
pub struct Cabinet {
    db: Database,
}

impl Cabinet {
    /// Open or create the clinic store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> CabinetResult<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    /// Create an in-memory clinic store (for testing).
    pub fn open_in_memory() -> CabinetResult<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    /// Direct access to the underlying store.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Allocator over this store's reserved-number pool.
    pub fn allocator(&self) -> NumberAllocator<'_> {
        NumberAllocator::new(&self.db)
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// The full appointment collection.
    pub fn appointments(&self) -> CabinetResult<Vec<Appointment>> {
        Ok(self.db.load_appointments()?)
    }

    /// Get one appointment by id.
    pub fn appointment(&self, id: &str) -> CabinetResult<Appointment> {
        self.db
            .get_appointment(id)?
            .ok_or_else(|| CabinetError::AppointmentNotFound(id.to_string()))
    }

    /// Book an appointment: assigns a fresh id and defaults the status to
    /// `En attente`.
    pub fn add_appointment(&self, appointment: Appointment) -> CabinetResult<Appointment> {
        let mut appointment = appointment;
        appointment.id = uuid::Uuid::new_v4().to_string();
        if appointment.status == AppointmentStatus::Unset {
            appointment.status = AppointmentStatus::EnAttente;
        }
        self.db.add_appointment(&appointment)?;
        Ok(appointment)
    }

    /// Apply an arbitrary edit to one appointment.
    pub fn update_appointment<F>(&self, id: &str, edit: F) -> CabinetResult<Appointment>
    where
        F: FnOnce(&mut Appointment),
    {
        if !self.db.update_appointment(id, edit)? {
            return Err(CabinetError::AppointmentNotFound(id.to_string()));
        }
        self.appointment(id)
    }

    /// All appointments on a calendar day, ordered by time.
    pub fn appointments_on(&self, date: NaiveDate) -> CabinetResult<Vec<Appointment>> {
        Ok(schedule::appointments_on(&self.db.load_appointments()?, date))
    }

    /// Whether a slot is free, optionally ignoring one appointment.
    pub fn is_slot_available(
        &self,
        at: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> CabinetResult<bool> {
        Ok(schedule::is_slot_available(
            &self.db.load_appointments()?,
            at,
            exclude_id,
        ))
    }

    /// Save a consultation-table edit.
    ///
    /// Moving to `Validé` enforces the fiche rules (present, well-formed,
    /// globally unique) and settles the patient number: taken from the
    /// edit, inherited from the linked patient, or freshly allocated and
    /// reserved; a walk-in gets its Patient record created here. Moving
    /// away from `Validé` clears the fiche, keeps the number only when a
    /// Patient record holds it, and releases a provisional reservation.
    /// A rejected edit commits nothing.
    pub fn save_consultation_edit(
        &self,
        id: &str,
        edit: &ConsultationEdit,
    ) -> CabinetResult<Appointment> {
        let appointments = self.db.load_appointments()?;
        let patients = self.db.load_patients()?;
        let appointment = appointments
            .iter()
            .find(|apt| apt.id == id)
            .cloned()
            .ok_or_else(|| CabinetError::AppointmentNotFound(id.to_string()))?;

        let existing = appointment
            .patient_id
            .as_deref()
            .and_then(|pid| patients.iter().find(|p| p.id == pid));

        if edit.status == AppointmentStatus::Valide {
            let fiche = reconcile::check_fiche_for_validation(&edit.fiche_number, &appointments, id)?;

            let numero = match edit.numero_patient.as_deref().filter(|n| !n.is_empty()) {
                Some(manual) => manual.to_string(),
                None => match existing {
                    Some(patient) => patient.numero_patient.clone(),
                    None => {
                        let allocator = self.allocator();
                        let numero = allocator.next_number()?;
                        allocator.reserve(&numero)?;
                        numero
                    }
                },
            };

            let mut patient_id = appointment.patient_id.clone();
            if let Some(patient) = existing {
                self.db.update_patient(&patient.id, |p| {
                    p.numero_patient = numero.clone();
                })?;
            } else if let PatientRef::Provisional { nom, prenom, telephone } =
                appointment.patient_ref()
            {
                let mut patient = Patient::new(nom, prenom, &numero);
                patient.telephone = telephone.unwrap_or_default().to_string();
                info!(numero = %numero, "création du dossier patient à la validation");
                self.db.add_patient(&patient)?;
                patient_id = Some(patient.id);
            }

            self.update_appointment(id, |apt| {
                apt.status = AppointmentStatus::Valide;
                apt.fiche_number = Some(fiche);
                apt.numero_patient = Some(numero);
                apt.patient_id = patient_id;
            })
        } else {
            // Any other status drops the fiche; the number survives only
            // when a registered patient holds it.
            let kept_numero = existing.map(|p| p.numero_patient.clone());
            if existing.is_none() {
                if let Some(numero) = appointment.numero_patient.as_deref() {
                    self.allocator().release(numero, &patients)?;
                }
            }

            let status = edit.status;
            self.update_appointment(id, |apt| {
                apt.status = status;
                apt.fiche_number = None;
                apt.numero_patient = kept_numero;
            })
        }
    }

    /// Save a billing-table edit. A zero amount forces the payment method
    /// back to none.
    pub fn save_billing_edit(&self, id: &str, edit: &BillingEdit) -> CabinetResult<Appointment> {
        let edit = edit.clone();
        self.update_appointment(id, move |apt| {
            apt.payment_method = if models::parse_amount(&edit.amount) == 0.0 {
                PaymentMethod::Aucun
            } else {
                edit.payment_method
            };
            apt.amount = edit.amount;
            apt.mutuelle = edit.mutuelle;
            apt.type_ = edit.type_;
            apt.status = edit.status;
        })
    }

    /// Delete an appointment.
    ///
    /// A provisional number with no backing Patient record is released.
    /// Deleting a validated appointment also deletes every other
    /// appointment of the same patient on the same calendar day.
    pub fn delete_appointment(&self, id: &str) -> CabinetResult<bool> {
        let appointments = self.db.load_appointments()?;
        let patients = self.db.load_patients()?;
        let appointment = match appointments.iter().find(|apt| apt.id == id) {
            Some(apt) => apt.clone(),
            None => return Ok(false),
        };

        if appointment.patient_id.is_none() {
            if let Some(numero) = appointment.numero_patient.as_deref() {
                self.allocator().release(numero, &patients)?;
            }
        }

        self.db.delete_appointment(id)?;

        if appointment.status == AppointmentStatus::Valide {
            if let Some(patient_id) = appointment.patient_id.as_deref() {
                let cascade: Vec<String> = appointments
                    .iter()
                    .filter(|apt| {
                        apt.id != id
                            && apt.patient_id.as_deref() == Some(patient_id)
                            && apt.same_day_as(&appointment)
                    })
                    .map(|apt| apt.id.clone())
                    .collect();
                if !cascade.is_empty() {
                    info!(
                        patient_id,
                        count = cascade.len(),
                        "suppression en cascade des rendez-vous du jour"
                    );
                }
                for other_id in cascade {
                    self.db.delete_appointment(&other_id)?;
                }
            }
        }

        Ok(true)
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// The full patient collection.
    pub fn patients(&self) -> CabinetResult<Vec<Patient>> {
        Ok(self.db.load_patients()?)
    }

    /// Register a patient. An empty number is allocated from the pool;
    /// a well-formed one is reserved (idempotently) so the pool always
    /// covers registered patients.
    pub fn register_patient(&self, patient: Patient) -> CabinetResult<Patient> {
        let mut patient = patient;
        let allocator = self.allocator();
        if patient.numero_patient.is_empty() {
            patient.numero_patient = allocator.next_number()?;
        }
        allocator.reserve(&patient.numero_patient)?;
        self.db.add_patient(&patient)?;
        Ok(patient)
    }

    /// Apply an edit to one patient's record.
    pub fn update_patient<F>(&self, id: &str, edit: F) -> CabinetResult<bool>
    where
        F: FnOnce(&mut Patient),
    {
        Ok(self.db.update_patient(id, edit)?)
    }

    /// The patient listing with duplicates collapsed.
    pub fn unique_patients(&self) -> CabinetResult<Vec<Patient>> {
        Ok(patients::dedupe(&self.db.load_patients()?))
    }

    /// The deduplicated patient listing with visit statistics.
    pub fn enriched_patients(&self, now: DateTime<Utc>) -> CabinetResult<Vec<EnrichedPatient>> {
        let appointments = self.db.load_appointments()?;
        Ok(patients::dedupe(&self.db.load_patients()?)
            .iter()
            .map(|p| patients::enrich(p, &appointments, now))
            .collect())
    }

    /// A patient's earlier fiche numbers, grouped for display.
    pub fn previous_fiche_numbers(
        &self,
        patient_id: Option<&str>,
        before_time: &str,
        current_patient: Option<&Patient>,
    ) -> CabinetResult<Vec<String>> {
        let appointments = self.db.load_appointments()?;
        let patients = self.db.load_patients()?;
        Ok(fiche::previous_numbers(
            &appointments,
            &patients,
            patient_id,
            before_time,
            current_patient,
        ))
    }

    // =========================================================================
    // Billing Operations
    // =========================================================================

    /// The billing rows: validated consultations, newest first.
    pub fn billing_entries(&self) -> CabinetResult<Vec<BillingEntry>> {
        let appointments = self.db.load_appointments()?;
        let patients = self.db.load_patients()?;
        Ok(export::billing_entries(&appointments, &patients))
    }

    /// Build a billing export batch.
    pub fn export_billing(&self) -> CabinetResult<BillingExport> {
        Ok(BillingExport::new(self.billing_entries()?))
    }

    /// Record payment details for one appointment.
    pub fn record_payment(&self, appointment_id: &str, data: &PaymentData) -> CabinetResult<()> {
        Ok(self.db.update_payment(appointment_id, data)?)
    }

    /// Payment details recorded for one appointment, if any.
    pub fn payment_data(&self, appointment_id: &str) -> CabinetResult<Option<PaymentData>> {
        Ok(self.db.load_payments()?.remove(appointment_id))
    }
}
