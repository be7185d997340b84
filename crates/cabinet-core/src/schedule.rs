//! Clinic schedule: the time-slot grid and slot availability.
//!
//! The calendar works on a fixed half-hour grid. Closure rules: the
//! clinic is closed on Sundays, on Saturday afternoons from 13:30, and
//! every day after the last consultation at 17:30; later grid slots exist
//! only for exceptional bookings and are flagged with a closure reason.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use chrono::{Datelike, Timelike};

use crate::models::Appointment;

/// First slot of the day.
pub const OPENING_HOUR: u32 = 9;

/// Number of half-hour slots in the grid (09:00 through 22:00).
pub const SLOT_COUNT: usize = 27;

/// The half-hour slot grid for one day.
pub fn time_slots() -> Vec<NaiveTime> {
    (0..SLOT_COUNT as u32)
        .filter_map(|i| {
            NaiveTime::from_hms_opt(OPENING_HOUR + i / 2, (i % 2) * 30, 0)
        })
        .collect()
}

/// Why a slot is outside consultation hours, if it is.
pub fn break_time_reason(date: NaiveDate, time: NaiveTime) -> Option<&'static str> {
    let minutes = time.hour() * 60 + time.minute();

    if date.weekday() == Weekday::Sun {
        return Some("Fermé le dimanche");
    }
    if date.weekday() == Weekday::Sat && minutes >= 13 * 60 + 30 {
        return Some("Fermé le samedi après-midi");
    }
    if minutes >= 17 * 60 + 30 {
        return Some("Fin des consultations");
    }
    None
}

/// Whether a slot is outside consultation hours.
pub fn is_break_time(date: NaiveDate, time: NaiveTime) -> bool {
    break_time_reason(date, time).is_some()
}

/// Whether a slot is free at the exact date and minute, optionally
/// ignoring one appointment (the one being rescheduled).
pub fn is_slot_available(
    appointments: &[Appointment],
    at: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> bool {
    let wanted = at.format("%Y-%m-%d %H:%M").to_string();

    !appointments.iter().any(|apt| {
        if exclude_id == Some(apt.id.as_str()) {
            return false;
        }
        match apt.parsed_time() {
            Some(t) => t.format("%Y-%m-%d %H:%M").to_string() == wanted,
            None => false,
        }
    })
}

/// All appointments on a calendar day, ordered by time.
pub fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<Appointment> {
    let mut day: Vec<Appointment> = appointments
        .iter()
        .filter(|apt| apt.date() == Some(date))
        .cloned()
        .collect();
    day.sort_by_key(|apt| apt.parsed_time());
    day
}
