//! Patient store operations.

use super::{Database, StoreResult, PATIENTS_KEY};
use crate::models::Patient;

impl Database {
    /// Load the full patient collection.
    pub fn load_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.read_json(PATIENTS_KEY)?.unwrap_or_default())
    }

    /// Persist the full patient collection.
    pub fn save_patients(&self, patients: &[Patient]) -> StoreResult<()> {
        self.write_json(PATIENTS_KEY, &patients)
    }

    /// Append one patient and persist.
    pub fn add_patient(&self, patient: &Patient) -> StoreResult<()> {
        let mut patients = self.load_patients()?;
        patients.push(patient.clone());
        self.save_patients(&patients)
    }

    /// Apply an edit to the patient with the given id and persist.
    /// Returns whether the patient existed.
    pub fn update_patient<F>(&self, id: &str, edit: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Patient),
    {
        let mut patients = self.load_patients()?;
        match patients.iter_mut().find(|p| p.id == id) {
            Some(patient) => {
                edit(patient);
                self.save_patients(&patients)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get one patient by id.
    pub fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.load_patients()?.into_iter().find(|p| p.id == id))
    }
}
