//! Appointment store operations.

use tracing::error;

use super::{Database, StoreResult, APPOINTMENTS_KEY};
use crate::models::Appointment;

impl Database {
    /// Load the full appointment collection.
    ///
    /// A corrupt document is logged and treated as an empty collection,
    /// matching the legacy loader; the next save overwrites it.
    pub fn load_appointments(&self) -> StoreResult<Vec<Appointment>> {
        match self.read_raw(APPOINTMENTS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(appointments) => Ok(appointments),
                Err(e) => {
                    error!("Erreur lors du chargement des rendez-vous: {}", e);
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Persist the full appointment collection.
    pub fn save_appointments(&self, appointments: &[Appointment]) -> StoreResult<()> {
        self.write_json(APPOINTMENTS_KEY, &appointments)
    }

    /// Append one appointment and persist.
    pub fn add_appointment(&self, appointment: &Appointment) -> StoreResult<()> {
        let mut appointments = self.load_appointments()?;
        appointments.push(appointment.clone());
        self.save_appointments(&appointments)
    }

    /// Apply an edit to the appointment with the given id and persist.
    /// Returns whether the appointment existed.
    pub fn update_appointment<F>(&self, id: &str, edit: F) -> StoreResult<bool>
    where
        F: FnOnce(&mut Appointment),
    {
        let mut appointments = self.load_appointments()?;
        match appointments.iter_mut().find(|apt| apt.id == id) {
            Some(apt) => {
                edit(apt);
                self.save_appointments(&appointments)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the appointment with the given id and persist.
    /// Returns whether the appointment existed.
    pub fn delete_appointment(&self, id: &str) -> StoreResult<bool> {
        let mut appointments = self.load_appointments()?;
        let before = appointments.len();
        appointments.retain(|apt| apt.id != id);
        if appointments.len() == before {
            return Ok(false);
        }
        self.save_appointments(&appointments)?;
        Ok(true)
    }

    /// Get one appointment by id.
    pub fn get_appointment(&self, id: &str) -> StoreResult<Option<Appointment>> {
        Ok(self
            .load_appointments()?
            .into_iter()
            .find(|apt| apt.id == id))
    }
}
