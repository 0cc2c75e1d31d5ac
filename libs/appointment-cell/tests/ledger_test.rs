use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentQueryParams, BookAppointmentRequest, BookingError, RescheduleAppointmentRequest,
};
use appointment_cell::services::ledger::LedgerService;
use doctor_cell::models::DeclareWindowRequest;
use doctor_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_models::auth::Principal;
use shared_models::schedule::{Doctor, Patient, WindowSchedule};
use shared_store::{AppState, DoctorStore, PatientStore};

fn test_state(require_slot_alignment: bool) -> Arc<AppState> {
    AppState::in_memory(AppConfig {
        jwt_secret: "test-secret-key-for-jwt-validation".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        mail_gateway_url: String::new(),
        mail_from: "no-reply@clinic.local".to_string(),
        default_slot_minutes: 30,
        require_slot_alignment,
    })
}

async fn seed_doctor(state: &AppState, approved: bool) -> Uuid {
    let now = Utc::now();
    let doctor = Doctor {
        id: Uuid::new_v4(),
        full_name: "Asha Naidoo".to_string(),
        email: "asha.naidoo@clinic.local".to_string(),
        specialty: "Dermatology".to_string(),
        bio: None,
        contact: None,
        is_approved: approved,
        created_at: now,
        updated_at: now,
    };
    state.doctors.insert_doctor(doctor).await.unwrap().id
}

async fn seed_patient(state: &AppState) -> Uuid {
    let now = Utc::now();
    let patient = Patient {
        id: Uuid::new_v4(),
        full_name: "Milo Ferreira".to_string(),
        email: "milo.ferreira@example.com".to_string(),
        age: Some(34),
        contact: None,
        created_at: now,
        updated_at: now,
    };
    state.patients.insert_patient(patient).await.unwrap().id
}

fn booking_date() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(7)
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, minute, 0).unwrap().and_utc()
}

/// Dated window 09:00-10:00 with 30-minute slots on `date`.
async fn declare_morning_window(state: &AppState, doctor_id: Uuid, date: NaiveDate) {
    let availability = AvailabilityService::new(state);
    availability
        .declare(
            doctor_id,
            DeclareWindowRequest {
                start_time: "09:00:00".parse().unwrap(),
                end_time: "10:00:00".parse().unwrap(),
                schedule: WindowSchedule::Dated {
                    date,
                    slot_minutes: 30,
                },
            },
        )
        .await
        .unwrap();
}

fn book_request(doctor_id: Uuid, start: DateTime<Utc>, minutes: i64) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        start_time: start,
        end_time: start + Duration::minutes(minutes),
    }
}

#[tokio::test]
async fn booking_inside_window_succeeds_and_overlap_is_rejected() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;

    let first_patient = seed_patient(&state).await;
    let appointment = ledger
        .book(
            Principal::Patient(first_patient),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .expect("09:00-09:30 inside the window must book");
    assert_eq!(appointment.doctor_id, doctor_id);
    assert_eq!(appointment.duration(), Duration::minutes(30));

    // 09:15-09:45 overlaps the existing booking: 09:00 < 09:45 and 09:30 > 09:15.
    let second_patient = seed_patient(&state).await;
    let result = ledger
        .book(
            Principal::Patient(second_patient),
            book_request(doctor_id, at(date, 9, 15), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::SlotTaken));
}

#[tokio::test]
async fn adjacent_bookings_do_not_conflict() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();
    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 30), 30),
        )
        .await
        .expect("[09:00,09:30) and [09:30,10:00) are disjoint");
}

#[tokio::test]
async fn booking_outside_window_fails() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let result = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 8, 0), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));
}

#[tokio::test]
async fn inverted_interval_fails_regardless_of_availability() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let patient_id = seed_patient(&state).await;
    let date = booking_date();

    // No window declared at all; the interval check comes first.
    let start = at(date, 9, 0);
    let result = ledger
        .book(
            Principal::Patient(patient_id),
            BookAppointmentRequest {
                doctor_id,
                start_time: start,
                end_time: start - Duration::minutes(30),
            },
        )
        .await;
    assert_matches!(result, Err(BookingError::InvalidInterval));
}

#[tokio::test]
async fn booking_in_the_past_fails() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let patient_id = seed_patient(&state).await;

    let start = Utc::now() - Duration::hours(2);
    let result = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, start, 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::NotInFuture));
}

#[tokio::test]
async fn unapproved_doctor_is_not_bookable() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, false).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let result = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::DoctorNotFound));
}

#[tokio::test]
async fn doctors_cannot_create_bookings() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;

    let result = ledger
        .book(
            Principal::Doctor(doctor_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::NotOwner));
}

#[tokio::test]
async fn recurring_window_admits_bookings_on_its_weekday_only() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let patient_id = seed_patient(&state).await;

    let mut monday = booking_date();
    while monday.weekday() != Weekday::Mon {
        monday += Duration::days(1);
    }

    let availability = AvailabilityService::new(&state);
    availability
        .declare(
            doctor_id,
            DeclareWindowRequest {
                start_time: "14:00:00".parse().unwrap(),
                end_time: "16:00:00".parse().unwrap(),
                schedule: WindowSchedule::Recurring {
                    weekday: Weekday::Mon,
                },
            },
        )
        .await
        .unwrap();

    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(monday, 14, 30), 30),
        )
        .await
        .expect("monday afternoon is covered by the recurring window");

    let tuesday = monday + Duration::days(1);
    let result = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(tuesday, 14, 30), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));
}

#[tokio::test]
async fn strict_policy_requires_exact_slot_alignment() {
    let state = test_state(true);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    // Inside the window but not on a generated slot boundary.
    let result = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 15), 30),
        )
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));

    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 30), 30),
        )
        .await
        .expect("the generated 09:30-10:00 slot books under strict alignment");
}

#[tokio::test]
async fn reschedule_onto_own_slot_succeeds() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let appointment = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();

    // Same interval as its own current slot: the self-exclusion makes this legal.
    let rescheduled = ledger
        .reschedule(
            Principal::Patient(patient_id),
            appointment.id,
            RescheduleAppointmentRequest {
                start_time: appointment.start_time,
                end_time: appointment.end_time,
            },
        )
        .await
        .expect("rescheduling onto the appointment's own slot must succeed");
    assert_eq!(rescheduled.start_time, appointment.start_time);
}

#[tokio::test]
async fn reschedule_by_non_owner_is_forbidden() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let owner = seed_patient(&state).await;
    let stranger = seed_patient(&state).await;

    let appointment = ledger
        .book(
            Principal::Patient(owner),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();

    let result = ledger
        .reschedule(
            Principal::Patient(stranger),
            appointment.id,
            RescheduleAppointmentRequest {
                start_time: at(date, 9, 30),
                end_time: at(date, 10, 0),
            },
        )
        .await;
    assert_matches!(result, Err(BookingError::NotOwner));
}

#[tokio::test]
async fn reschedule_into_another_booking_is_rejected() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let first = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();
    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 30), 30),
        )
        .await
        .unwrap();

    let result = ledger
        .reschedule(
            Principal::Patient(patient_id),
            first.id,
            RescheduleAppointmentRequest {
                start_time: at(date, 9, 30),
                end_time: at(date, 10, 0),
            },
        )
        .await;
    assert_matches!(result, Err(BookingError::SlotTaken));
}

#[tokio::test]
async fn cancel_frees_the_slot() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let appointment = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();

    ledger
        .cancel(Principal::Patient(patient_id), appointment.id)
        .await
        .unwrap();

    let other_patient = seed_patient(&state).await;
    ledger
        .book(
            Principal::Patient(other_patient),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .expect("a cancelled slot can be rebooked");
}

#[tokio::test]
async fn cancel_is_limited_to_the_parties() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let appointment = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();

    let stranger = seed_patient(&state).await;
    let result = ledger
        .cancel(Principal::Patient(stranger), appointment.id)
        .await;
    assert_matches!(result, Err(BookingError::NotOwner));

    // The doctor side of the booking may cancel.
    ledger
        .cancel(Principal::Doctor(doctor_id), appointment.id)
        .await
        .expect("the appointment's doctor may cancel");
}

#[tokio::test]
async fn access_is_scoped_to_the_parties() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    let appointment = ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();

    let stranger = seed_patient(&state).await;
    assert_matches!(
        ledger.get(Principal::Patient(stranger), appointment.id).await,
        Err(BookingError::NotOwner)
    );
    assert_matches!(
        ledger.get(Principal::Patient(patient_id), appointment.id).await,
        Ok(_)
    );
    assert_matches!(
        ledger.get(Principal::Doctor(doctor_id), appointment.id).await,
        Ok(_)
    );
}

#[tokio::test]
async fn listing_returns_own_appointments_within_range() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;
    let other_patient = seed_patient(&state).await;

    ledger
        .book(
            Principal::Patient(patient_id),
            book_request(doctor_id, at(date, 9, 0), 30),
        )
        .await
        .unwrap();
    ledger
        .book(
            Principal::Patient(other_patient),
            book_request(doctor_id, at(date, 9, 30), 30),
        )
        .await
        .unwrap();

    let own = ledger
        .list_for(
            Principal::Patient(patient_id),
            AppointmentQueryParams { from: None, to: None },
        )
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    let doctor_side = ledger
        .list_for(
            Principal::Doctor(doctor_id),
            AppointmentQueryParams { from: None, to: None },
        )
        .await
        .unwrap();
    assert_eq!(doctor_side.len(), 2);

    let out_of_range = ledger
        .list_for(
            Principal::Doctor(doctor_id),
            AppointmentQueryParams {
                from: Some(at(date, 11, 0)),
                to: None,
            },
        )
        .await
        .unwrap();
    assert!(out_of_range.is_empty());
}

#[tokio::test]
async fn doctor_ledger_stays_pairwise_disjoint() {
    let state = test_state(false);
    let ledger = LedgerService::new(&state);
    let doctor_id = seed_doctor(&state, true).await;
    let date = booking_date();
    declare_morning_window(&state, doctor_id, date).await;
    let patient_id = seed_patient(&state).await;

    for minute in [0, 15, 30, 45] {
        // Only the half-hour starts fit; the rest fail one rule or another.
        let _ = ledger
            .book(
                Principal::Patient(patient_id),
                book_request(doctor_id, at(date, 9, minute), 30),
            )
            .await;
    }

    let booked = ledger
        .list_for(
            Principal::Doctor(doctor_id),
            AppointmentQueryParams { from: None, to: None },
        )
        .await
        .unwrap();

    for (i, a) in booked.iter().enumerate() {
        for b in booked.iter().skip(i + 1) {
            assert!(
                !a.overlaps_range(b.start_time, b.end_time),
                "ledger must stay pairwise disjoint"
            );
        }
    }
    assert_eq!(booked.len(), 2);
}
