//! Patient number allocation.
//!
//! Patient numbers (`P####`) are handed out before a Patient record
//! necessarily exists: validating an appointment for a walk-in reserves a
//! number in a persisted pool so that two provisional patients can never
//! collide. Numbers held by actual patients are implicitly reserved; a
//! number is releasable only while no patient holds it.

use thiserror::Error;
use tracing::debug;

use crate::db::{Database, StoreError};
use crate::models::Patient;

const NUMBER_PREFIX: char = 'P';
const NUMBER_LENGTH: usize = 4;

/// Allocation errors.
#[derive(Error, Debug)]
pub enum NumberError {
    #[error("Format de numéro patient invalide: {0}. Format attendu: PXXXX")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub type NumberResult<T> = Result<T, NumberError>;

/// Format a numeric value as a patient number (`7` -> `P0007`).
pub fn format_number(n: u32) -> String {
    format!("{}{:0width$}", NUMBER_PREFIX, n, width = NUMBER_LENGTH)
}

/// Whether a string is a well-formed patient number (`P` + 4 digits).
pub fn is_valid_number(number: &str) -> bool {
    let bytes = number.as_bytes();
    bytes.len() == 1 + NUMBER_LENGTH
        && bytes[0] == NUMBER_PREFIX as u8
        && bytes[1..].iter().all(|b| b.is_ascii_digit())
}

/// Allocator over the persisted reserved-number pool.
///
/// Load and save go through the borrowed store handle; every reserve and
/// release persists the updated pool immediately (last write wins, single
/// user).
pub struct NumberAllocator<'a> {
    db: &'a Database,
}

impl<'a> NumberAllocator<'a> {
    /// Create an allocator over the given store.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// First free number, scanning upward from `P0001`. Read-only: the
    /// number is not reserved until [`reserve`](Self::reserve) is called.
    pub fn next_number(&self) -> NumberResult<String> {
        let used = self.db.load_reserved_numbers()?;
        let mut n = 1;
        while used.contains(&format_number(n)) {
            n += 1;
        }
        Ok(format_number(n))
    }

    /// Reserve a number. Idempotent; fails only on a malformed number.
    pub fn reserve(&self, number: &str) -> NumberResult<()> {
        if !is_valid_number(number) {
            return Err(NumberError::InvalidFormat(number.to_string()));
        }
        let mut used = self.db.load_reserved_numbers()?;
        if used.insert(number.to_string()) {
            debug!(number, "réservation du numéro patient");
        }
        self.db.save_reserved_numbers(&used)?;
        Ok(())
    }

    /// Release a number, unless a patient currently holds it. Returns
    /// whether the release occurred; a still-held number is a no-op, not
    /// an error.
    pub fn release(&self, number: &str, patients: &[Patient]) -> NumberResult<bool> {
        if patients.iter().any(|p| p.numero_patient == number) {
            return Ok(false);
        }
        let mut used = self.db.load_reserved_numbers()?;
        if used.remove(number) {
            debug!(number, "libération du numéro patient");
        }
        self.db.save_reserved_numbers(&used)?;
        Ok(true)
    }

    /// Whether a number is free: neither held by a patient nor reserved.
    pub fn is_available(&self, number: &str, patients: &[Patient]) -> NumberResult<bool> {
        if patients.iter().any(|p| p.numero_patient == number) {
            return Ok(false);
        }
        let used = self.db.load_reserved_numbers()?;
        Ok(!used.contains(number))
    }

    /// Rebuild the pool from the numbers actually held by patients.
    pub fn initialize_from_patients(&self, patients: &[Patient]) -> NumberResult<()> {
        let used = patients
            .iter()
            .filter(|p| is_valid_number(&p.numero_patient))
            .map(|p| p.numero_patient.clone())
            .collect();
        self.db.save_reserved_numbers(&used)?;
        Ok(())
    }
}

/// Find the patient holding a given number.
pub fn patient_by_number<'p>(number: &str, patients: &'p [Patient]) -> Option<&'p Patient> {
    patients.iter().find(|p| p.numero_patient == number)
}
