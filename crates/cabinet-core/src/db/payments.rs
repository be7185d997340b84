//! Payment-data store operations.
//!
//! Payment details are keyed by appointment id and persisted as one JSON
//! object map, mirroring the legacy payment storage.

use std::collections::HashMap;

use super::{Database, StoreResult, PAYMENTS_KEY};
use crate::models::PaymentData;

impl Database {
    /// Load all recorded payment data.
    pub fn load_payments(&self) -> StoreResult<HashMap<String, PaymentData>> {
        Ok(self.read_json(PAYMENTS_KEY)?.unwrap_or_default())
    }

    /// Persist the full payment map.
    pub fn save_payments(&self, payments: &HashMap<String, PaymentData>) -> StoreResult<()> {
        self.write_json(PAYMENTS_KEY, payments)
    }

    /// Record payment data for one appointment and persist.
    pub fn update_payment(&self, appointment_id: &str, data: &PaymentData) -> StoreResult<()> {
        let mut payments = self.load_payments()?;
        payments.insert(appointment_id.to_string(), data.clone());
        self.save_payments(&payments)
    }

    /// Remove payment data for one appointment and persist.
    pub fn delete_payment(&self, appointment_id: &str) -> StoreResult<()> {
        let mut payments = self.load_payments()?;
        payments.remove(appointment_id);
        self.save_payments(&payments)
    }

    /// Drop all payment data.
    pub fn clear_payments(&self) -> StoreResult<()> {
        self.conn()
            .execute("DELETE FROM storage WHERE key = ?", [PAYMENTS_KEY])?;
        Ok(())
    }
}
