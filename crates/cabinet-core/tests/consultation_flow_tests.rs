//! End-to-end tests for the consultation edit flow: validation rules,
//! patient-number lifecycle, cascade deletion and the patient listing.

use chrono::{DateTime, Utc};

use cabinet_core::{
    Appointment, AppointmentStatus, Cabinet, CabinetError, ConsultationEdit, Patient,
    ValidationError,
};

fn at(time: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(time)
        .unwrap()
        .with_timezone(&Utc)
}

fn walk_in(cabinet: &Cabinet, time: &str, nom: &str, prenom: &str) -> Appointment {
    let mut apt = Appointment::new(time);
    apt.nom = Some(nom.to_string());
    apt.prenom = Some(prenom.to_string());
    apt.telephone = Some("0600000000".to_string());
    cabinet.add_appointment(apt).unwrap()
}

fn validate_edit(fiche: &str) -> ConsultationEdit {
    ConsultationEdit {
        status: AppointmentStatus::Valide,
        fiche_number: fiche.to_string(),
        numero_patient: None,
    }
}

fn assert_validation_error(result: Result<Appointment, CabinetError>, expected: ValidationError) {
    match result {
        Err(CabinetError::Validation(err)) => assert_eq!(err, expected),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_validation_requires_fiche() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");

    let result = cabinet.save_consultation_edit(&apt.id, &validate_edit(""));
    assert_validation_error(result, ValidationError::MissingFiche);

    // Nothing was committed.
    let unchanged = cabinet.appointment(&apt.id).unwrap();
    assert_eq!(unchanged.status, AppointmentStatus::EnAttente);
    assert!(cabinet.patients().unwrap().is_empty());
}

#[test]
fn test_validation_rejects_bad_format() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");

    let result = cabinet.save_consultation_edit(&apt.id, &validate_edit("1-2-3"));
    assert_validation_error(result, ValidationError::InvalidFicheFormat);
    assert!(cabinet.patients().unwrap().is_empty());
}

#[test]
fn test_validation_rejects_duplicate_fiche() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let first = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");
    let second = walk_in(&cabinet, "2025-03-10T11:00:00Z", "Idrissi", "Sara");

    cabinet
        .save_consultation_edit(&first.id, &validate_edit("F01-0001"))
        .unwrap();

    // Same fiche, different input spelling: still a duplicate.
    let result = cabinet.save_consultation_edit(&second.id, &validate_edit("f1-1"));
    assert_validation_error(result, ValidationError::DuplicateFiche);

    let unchanged = cabinet.appointment(&second.id).unwrap();
    assert_eq!(unchanged.status, AppointmentStatus::EnAttente);
}

#[test]
fn test_validating_walk_in_creates_patient_and_reserves_number() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");

    let saved = cabinet
        .save_consultation_edit(&apt.id, &validate_edit("1-5"))
        .unwrap();

    assert_eq!(saved.status, AppointmentStatus::Valide);
    assert_eq!(saved.fiche_number.as_deref(), Some("F01-0005"));
    assert_eq!(saved.numero_patient.as_deref(), Some("P0001"));

    let patients = cabinet.patients().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].nom, "Ben");
    assert_eq!(patients[0].numero_patient, "P0001");
    assert_eq!(patients[0].telephone, "0600000000");
    assert_eq!(saved.patient_id.as_deref(), Some(patients[0].id.as_str()));

    // The number is reserved in the pool.
    assert!(!cabinet
        .allocator()
        .is_available("P0001", &patients)
        .unwrap());
}

#[test]
fn test_successive_walk_ins_get_successive_numbers() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let first = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");
    let second = walk_in(&cabinet, "2025-03-11T10:00:00Z", "Idrissi", "Sara");

    let first = cabinet
        .save_consultation_edit(&first.id, &validate_edit("F01-0001"))
        .unwrap();
    let second = cabinet
        .save_consultation_edit(&second.id, &validate_edit("F01-0002"))
        .unwrap();

    assert_eq!(first.numero_patient.as_deref(), Some("P0001"));
    assert_eq!(second.numero_patient.as_deref(), Some("P0002"));
}

#[test]
fn test_validating_linked_patient_inherits_number() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let patient = cabinet
        .register_patient(Patient::new("Ben", "Ali", "P0042"))
        .unwrap();

    let mut apt = Appointment::new("2025-03-10T10:00:00Z");
    apt.patient_id = Some(patient.id.clone());
    let apt = cabinet.add_appointment(apt).unwrap();

    let saved = cabinet
        .save_consultation_edit(&apt.id, &validate_edit("F02-0001"))
        .unwrap();
    assert_eq!(saved.numero_patient.as_deref(), Some("P0042"));
    // No second patient record was created.
    assert_eq!(cabinet.patients().unwrap().len(), 1);
}

#[test]
fn test_manual_number_in_edit_wins() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");

    let edit = ConsultationEdit {
        status: AppointmentStatus::Valide,
        fiche_number: "F01-0001".to_string(),
        numero_patient: Some("P0099".to_string()),
    };
    let saved = cabinet.save_consultation_edit(&apt.id, &edit).unwrap();

    assert_eq!(saved.numero_patient.as_deref(), Some("P0099"));
    assert_eq!(cabinet.patients().unwrap()[0].numero_patient, "P0099");
}

#[test]
fn test_unvalidating_clears_fiche_and_releases_provisional_number() {
    let cabinet = Cabinet::open_in_memory().unwrap();

    // A slot holding a reserved number with no backing Patient record.
    let mut apt = Appointment::new("2025-03-10T10:00:00Z");
    apt.status = AppointmentStatus::Valide;
    apt.fiche_number = Some("F01-0001".to_string());
    apt.numero_patient = Some("P0005".to_string());
    let apt = cabinet.add_appointment(apt).unwrap();
    cabinet.allocator().reserve("P0005").unwrap();

    let edit = ConsultationEdit {
        status: AppointmentStatus::Annule,
        fiche_number: String::new(),
        numero_patient: None,
    };
    let saved = cabinet.save_consultation_edit(&apt.id, &edit).unwrap();

    assert_eq!(saved.status, AppointmentStatus::Annule);
    assert!(saved.fiche_number.is_none());
    assert!(saved.numero_patient.is_none());
    // The provisional reservation is gone.
    assert!(cabinet.allocator().is_available("P0005", &[]).unwrap());
}

#[test]
fn test_unvalidating_keeps_number_owned_by_patient() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");
    cabinet
        .save_consultation_edit(&apt.id, &validate_edit("F01-0001"))
        .unwrap();

    let edit = ConsultationEdit {
        status: AppointmentStatus::Reporte,
        fiche_number: String::new(),
        numero_patient: None,
    };
    let saved = cabinet.save_consultation_edit(&apt.id, &edit).unwrap();

    // The Patient record now owns P0001: the reservation stays.
    assert!(saved.fiche_number.is_none());
    assert_eq!(saved.numero_patient.as_deref(), Some("P0001"));
    let patients = cabinet.patients().unwrap();
    assert!(!cabinet
        .allocator()
        .is_available("P0001", &patients)
        .unwrap());
}

#[test]
fn test_freed_fiche_can_be_reused() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let first = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");
    let second = walk_in(&cabinet, "2025-03-10T11:00:00Z", "Idrissi", "Sara");

    cabinet
        .save_consultation_edit(&first.id, &validate_edit("F01-0001"))
        .unwrap();
    let edit = ConsultationEdit {
        status: AppointmentStatus::Annule,
        fiche_number: String::new(),
        numero_patient: None,
    };
    cabinet.save_consultation_edit(&first.id, &edit).unwrap();

    // The fiche was cleared on un-validation, so it is free again.
    let saved = cabinet
        .save_consultation_edit(&second.id, &validate_edit("F01-0001"))
        .unwrap();
    assert_eq!(saved.fiche_number.as_deref(), Some("F01-0001"));
}

#[test]
fn test_deleting_validated_appointment_cascades_same_day() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let patient = cabinet
        .register_patient(Patient::new("Ben", "Ali", "P0001"))
        .unwrap();

    let mut morning = Appointment::new("2025-03-10T10:00:00Z");
    morning.patient_id = Some(patient.id.clone());
    let morning = cabinet.add_appointment(morning).unwrap();
    cabinet
        .save_consultation_edit(&morning.id, &validate_edit("F01-0001"))
        .unwrap();

    let mut afternoon = Appointment::new("2025-03-10T15:00:00Z");
    afternoon.patient_id = Some(patient.id.clone());
    let afternoon = cabinet.add_appointment(afternoon).unwrap();

    let mut next_day = Appointment::new("2025-03-11T10:00:00Z");
    next_day.patient_id = Some(patient.id.clone());
    let next_day = cabinet.add_appointment(next_day).unwrap();

    assert!(cabinet.delete_appointment(&morning.id).unwrap());

    let remaining = cabinet.appointments().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, next_day.id);
    assert!(cabinet.appointment(&afternoon.id).is_err());
}

#[test]
fn test_deleting_pending_appointment_does_not_cascade() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let patient = cabinet
        .register_patient(Patient::new("Ben", "Ali", "P0001"))
        .unwrap();

    let mut morning = Appointment::new("2025-03-10T10:00:00Z");
    morning.patient_id = Some(patient.id.clone());
    let morning = cabinet.add_appointment(morning).unwrap();

    let mut afternoon = Appointment::new("2025-03-10T15:00:00Z");
    afternoon.patient_id = Some(patient.id.clone());
    cabinet.add_appointment(afternoon).unwrap();

    cabinet.delete_appointment(&morning.id).unwrap();
    assert_eq!(cabinet.appointments().unwrap().len(), 1);
}

#[test]
fn test_deleting_walk_in_releases_reserved_number() {
    let cabinet = Cabinet::open_in_memory().unwrap();

    let mut apt = Appointment::new("2025-03-10T10:00:00Z");
    apt.numero_patient = Some("P0003".to_string());
    let apt = cabinet.add_appointment(apt).unwrap();
    cabinet.allocator().reserve("P0003").unwrap();

    cabinet.delete_appointment(&apt.id).unwrap();
    assert!(cabinet.allocator().is_available("P0003", &[]).unwrap());
}

#[test]
fn test_patient_records_survive_appointment_deletion() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt = walk_in(&cabinet, "2025-03-10T10:00:00Z", "Ben", "Ali");
    cabinet
        .save_consultation_edit(&apt.id, &validate_edit("F01-0001"))
        .unwrap();

    cabinet.delete_appointment(&apt.id).unwrap();

    assert!(cabinet.appointments().unwrap().is_empty());
    assert_eq!(cabinet.patients().unwrap().len(), 1);
}

#[test]
fn test_enriched_listing_collapses_duplicates() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    cabinet
        .register_patient(Patient::new("Ben", "Ali", "P0002"))
        .unwrap();
    let keeper = cabinet
        .register_patient(Patient::new("ben", "ali", "P0001"))
        .unwrap();

    let mut apt = Appointment::new("2025-03-10T10:00:00Z");
    apt.patient_id = Some(keeper.id.clone());
    let apt = cabinet.add_appointment(apt).unwrap();
    cabinet
        .save_consultation_edit(&apt.id, &validate_edit("F01-0001"))
        .unwrap();

    let listing = cabinet.enriched_patients(at("2025-03-01T00:00:00Z")).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].patient.numero_patient, "P0001");
    assert_eq!(listing[0].nombre_consultations, 1);
    assert_eq!(listing[0].prochain_rdv.as_deref(), Some("10/03/2025 10:00"));
}

#[test]
fn test_previous_fiche_numbers_through_facade() {
    let cabinet = Cabinet::open_in_memory().unwrap();
    let apt1 = walk_in(&cabinet, "2025-01-10T10:00:00Z", "Ben", "Ali");
    let saved = cabinet
        .save_consultation_edit(&apt1.id, &validate_edit("F01-0001"))
        .unwrap();

    let apt2 = walk_in(&cabinet, "2025-02-10T10:00:00Z", "Ben", "Ali");
    cabinet
        .save_consultation_edit(&apt2.id, &validate_edit("F01-0003"))
        .unwrap();

    let patient = cabinet.patients().unwrap()[0].clone();
    let fiches = cabinet
        .previous_fiche_numbers(
            saved.patient_id.as_deref(),
            "2025-03-01T00:00:00Z",
            Some(&patient),
        )
        .unwrap();
    assert_eq!(fiches, vec!["F01-0003+0001"]);
}
