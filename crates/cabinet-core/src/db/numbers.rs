//! Reserved patient-number store operations.
//!
//! The pool is persisted as a JSON array of number strings, independently
//! of the patient collection, so that numbers reserved for not-yet-created
//! patients survive across sessions.

use std::collections::BTreeSet;

use super::{Database, StoreResult, PATIENT_NUMBERS_KEY};

impl Database {
    /// Load the reserved-number pool.
    pub fn load_reserved_numbers(&self) -> StoreResult<BTreeSet<String>> {
        let numbers: Option<Vec<String>> = self.read_json(PATIENT_NUMBERS_KEY)?;
        Ok(numbers.unwrap_or_default().into_iter().collect())
    }

    /// Persist the reserved-number pool.
    pub fn save_reserved_numbers(&self, numbers: &BTreeSet<String>) -> StoreResult<()> {
        let list: Vec<&String> = numbers.iter().collect();
        self.write_json(PATIENT_NUMBERS_KEY, &list)
    }
}
