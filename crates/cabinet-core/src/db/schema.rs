//! SQLite schema definition.

/// Complete database schema for cabinet-medical.
///
/// The legacy application persisted every collection as one JSON document
/// under a fixed key in browser-local storage. The store keeps that model:
/// a single key-value table, each value the JSON serialization of a whole
/// collection, rewritten in full on every mutation (last write wins).
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Storage key for the appointment collection.
pub const APPOINTMENTS_KEY: &str = "cabinet_medical_appointments";

/// Storage key for the patient collection.
pub const PATIENTS_KEY: &str = "cabinet_medical_patients";

/// Storage key for the reserved patient-number pool.
pub const PATIENT_NUMBERS_KEY: &str = "patient_numbers";

/// Storage key for per-appointment payment data.
pub const PAYMENTS_KEY: &str = "cabinet_medical_payments";
