//! Fiche (medical file) number validation and history grouping.
//!
//! Fiche numbers follow the clinic format `FXX-XXXX`. A fiche number is
//! mandatory and globally unique exactly when an appointment is validated.
//! The history grouper condenses a patient's earlier fiche numbers for the
//! "Ancien N° fiche" column: numbers sharing a two-digit prefix collapse
//! into `FXX-suffix+suffix+...`.

use chrono::{DateTime, Utc};

use crate::models::{Appointment, AppointmentStatus, Patient, PatientRef};

/// Normalize raw fiche input into the canonical `FXX-XXXX` form.
///
/// All characters except digits and `-` are stripped; a value with exactly
/// two dash-separated parts is zero-padded to 2 and 4 digits. Anything
/// else (including multi-dash input) passes through unchanged for
/// [`validate`] to reject.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let parts: Vec<&str> = cleaned.split('-').collect();

    if parts.len() == 2 {
        format!("F{:0>2}-{:0>4}", parts[0], parts[1])
    } else {
        raw.to_string()
    }
}

/// Whether a fiche number is well-formed (`FXX-XXXX`, case-insensitive).
/// The empty string is valid: no fiche is required yet.
pub fn validate(number: &str) -> bool {
    if number.is_empty() {
        return true;
    }
    let b = number.as_bytes();
    b.len() == 8
        && (b[0] == b'F' || b[0] == b'f')
        && b[1].is_ascii_digit()
        && b[2].is_ascii_digit()
        && b[3] == b'-'
        && b[4..8].iter().all(|c| c.is_ascii_digit())
}

/// Split a fiche number into its (prefix, suffix) digit groups.
fn fiche_parts(fiche: &str) -> Option<(&str, &str)> {
    let rest = fiche.strip_prefix('F')?;
    let (prefix, suffix) = rest.split_once('-')?;
    if prefix.is_empty()
        || suffix.is_empty()
        || !prefix.bytes().all(|b| b.is_ascii_digit())
        || !suffix.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((prefix, suffix))
}

fn same_name(a_nom: &str, a_prenom: &str, b: &Patient) -> bool {
    a_nom.to_lowercase() == b.nom.to_lowercase()
        && a_prenom.to_lowercase() == b.prenom.to_lowercase()
}

/// All fiche numbers of a patient's validated visits strictly before
/// `before_time`, deduplicated and grouped by prefix.
///
/// Ownership matches either by `patient_id` or, for the given
/// `current_patient`, by case-insensitive name (through the linked patient
/// record, or the raw name fields of a not-yet-registered visit). Within a
/// prefix group of more than one number, distinct numeric suffixes are
/// joined descending with `+`; groups are listed highest prefix first.
pub fn previous_numbers(
    appointments: &[Appointment],
    patients: &[Patient],
    patient_id: Option<&str>,
    before_time: &str,
    current_patient: Option<&Patient>,
) -> Vec<String> {
    let before = match DateTime::parse_from_rfc3339(before_time) {
        Ok(t) => t.with_timezone(&Utc),
        Err(_) => return Vec::new(),
    };

    let mut fiches: Vec<String> = Vec::new();
    for apt in appointments {
        if apt.status != AppointmentStatus::Valide {
            continue;
        }
        let fiche = match apt.fiche() {
            Some(f) => f,
            None => continue,
        };
        let time = match apt.parsed_time() {
            Some(t) => t,
            None => continue,
        };
        if time >= before {
            continue;
        }

        let by_id = match (patient_id, apt.patient_id.as_deref()) {
            (Some(wanted), Some(owner)) => wanted == owner,
            _ => false,
        };
        let by_name = current_patient
            .map(|current| match apt.patient_ref() {
                PatientRef::Linked { patient_id } => patients
                    .iter()
                    .find(|p| p.id == patient_id)
                    .map(|p| same_name(&p.nom, &p.prenom, current))
                    .unwrap_or(false),
                PatientRef::Provisional { nom, prenom, .. } => {
                    same_name(nom, prenom, current)
                }
                PatientRef::Unidentified => false,
            })
            .unwrap_or(false);

        if (by_id || by_name) && !fiches.iter().any(|f| f == fiche) {
            fiches.push(fiche.to_string());
        }
    }

    // Group by prefix, preserving first-occurrence order within a group.
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for fiche in &fiches {
        let prefix = match fiche_parts(fiche) {
            Some((prefix, _)) => prefix,
            None => continue,
        };
        match groups.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, members)) => members.push(fiche.clone()),
            None => groups.push((prefix.to_string(), vec![fiche.clone()])),
        }
    }

    // Highest prefix first.
    groups.sort_by_key(|(prefix, _)| std::cmp::Reverse(prefix.parse::<u64>().unwrap_or(0)));

    groups
        .into_iter()
        .map(|(prefix, members)| {
            if members.len() == 1 {
                return members.into_iter().next().unwrap_or_default();
            }
            let mut suffixes: Vec<&str> = members
                .iter()
                .filter_map(|f| fiche_parts(f).map(|(_, suffix)| suffix))
                .collect();
            suffixes.sort_by_key(|s| std::cmp::Reverse(s.parse::<u64>().unwrap_or(0)));
            let mut seen: Vec<u64> = Vec::new();
            suffixes.retain(|s| {
                let value = s.parse::<u64>().unwrap_or(0);
                if seen.contains(&value) {
                    false
                } else {
                    seen.push(value);
                    true
                }
            });
            format!("F{}-{}", prefix, suffixes.join("+"))
        })
        .collect()
}
