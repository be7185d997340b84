//! Billing view derivation and export.

mod billing;

pub use billing::*;
