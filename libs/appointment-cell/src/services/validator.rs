use chrono::{DateTime, Utc};
use uuid::Uuid;

use doctor_cell::services::slots;
use shared_models::schedule::{Appointment, AvailabilityWindow, WindowSchedule};

use crate::models::BookingError;

/// Booking rules that come from configuration rather than the data itself.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    pub default_slot_minutes: i64,
    pub require_slot_alignment: bool,
}

/// Present on the reschedule path: the record being replaced and who asked.
pub struct UpdateContext<'a> {
    pub existing: &'a Appointment,
    pub caller: Uuid,
}

/// Pure validation over a snapshot the ledger has already read. Performs no
/// I/O and no writes; checks run in a fixed order and stop at the first
/// failure. The ledger re-runs the overlap check inside the commit's
/// critical section, so a clean result here is necessary but not sufficient.
pub fn validate_booking(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    windows: &[AvailabilityWindow],
    conflicts: &[Appointment],
    policy: &BookingPolicy,
    update: Option<&UpdateContext<'_>>,
) -> Result<(), BookingError> {
    if start >= end {
        return Err(BookingError::InvalidInterval);
    }

    if start <= now {
        return Err(BookingError::NotInFuture);
    }

    if !windows.iter().any(|window| fits_window(window, start, end, policy)) {
        return Err(BookingError::OutsideAvailability);
    }

    if !conflicts.is_empty() {
        return Err(BookingError::SlotTaken);
    }

    if let Some(context) = update {
        if context.existing.patient_id != context.caller {
            return Err(BookingError::NotOwner);
        }
    }

    Ok(())
}

/// Containment in the window, plus exact slot alignment for dated windows
/// when the policy demands it. Recurring windows carry no slot size and are
/// containment-only.
fn fits_window(
    window: &AvailabilityWindow,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    policy: &BookingPolicy,
) -> bool {
    if !window.contains(start, end) {
        return false;
    }

    if policy.require_slot_alignment {
        if let WindowSchedule::Dated { .. } = window.schedule {
            return slots::generate(window, policy.default_slot_minutes)
                .iter()
                .any(|slot| slot.start_time == start.time() && slot.end_time == end.time());
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDate};
    use shared_models::schedule::WindowSchedule;

    const POLICY: BookingPolicy = BookingPolicy {
        default_slot_minutes: 30,
        require_slot_alignment: true,
    };

    fn window_on(date: NaiveDate, start: &str, end: &str, slot_minutes: i64) -> AvailabilityWindow {
        let now = Utc::now();
        AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            schedule: WindowSchedule::Dated { date, slot_minutes },
            created_at: now,
            updated_at: now,
        }
    }

    fn recurring_window(weekday: chrono::Weekday, start: &str, end: &str) -> AvailabilityWindow {
        let now = Utc::now();
        AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            schedule: WindowSchedule::Recurring { weekday },
            created_at: now,
            updated_at: now,
        }
    }

    fn appointment_at(start: DateTime<Utc>, minutes: i64) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            created_at: now,
            updated_at: now,
        }
    }

    fn tomorrow_at(hour: u32, minute: u32) -> DateTime<Utc> {
        (Utc::now() + Duration::days(1))
            .date_naive()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn inverted_interval_fails_before_anything_else() {
        let start = tomorrow_at(10, 0);
        // No windows at all: InvalidInterval must still win.
        let result = validate_booking(
            start,
            start - Duration::minutes(30),
            Utc::now(),
            &[],
            &[],
            &POLICY,
            None,
        );
        assert!(matches!(result, Err(BookingError::InvalidInterval)));
    }

    #[test]
    fn past_start_fails_before_availability() {
        let now = Utc::now();
        let start = now - Duration::hours(1);
        let result =
            validate_booking(start, start + Duration::minutes(30), now, &[], &[], &POLICY, None);
        assert!(matches!(result, Err(BookingError::NotInFuture)));
    }

    #[test]
    fn no_covering_window_is_outside_availability() {
        let start = tomorrow_at(8, 0);
        let window = window_on(start.date_naive(), "09:00:00", "10:00:00", 30);
        let result = validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            None,
        );
        assert!(matches!(result, Err(BookingError::OutsideAvailability)));
    }

    #[test]
    fn aligned_slot_in_dated_window_passes() {
        let start = tomorrow_at(9, 30);
        let window = window_on(start.date_naive(), "09:00:00", "10:00:00", 30);
        validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            None,
        )
        .expect("exact slot must validate");
    }

    #[test]
    fn unaligned_interval_rejected_only_under_strict_policy() {
        let start = tomorrow_at(9, 15);
        let window = window_on(start.date_naive(), "09:00:00", "10:00:00", 30);

        let strict = validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            None,
        );
        assert!(matches!(strict, Err(BookingError::OutsideAvailability)));

        let lenient = BookingPolicy {
            require_slot_alignment: false,
            ..POLICY
        };
        validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &lenient,
            None,
        )
        .expect("containment is enough when alignment is off");
    }

    #[test]
    fn recurring_window_is_containment_only() {
        let start = tomorrow_at(9, 10);
        let window = recurring_window(start.date_naive().weekday(), "09:00:00", "12:00:00");
        validate_booking(
            start,
            start + Duration::minutes(25),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            None,
        )
        .expect("recurring windows do not require slot alignment");
    }

    #[test]
    fn existing_conflict_is_slot_taken() {
        let start = tomorrow_at(9, 0);
        let window = window_on(start.date_naive(), "09:00:00", "12:00:00", 30);
        let conflict = appointment_at(start + Duration::minutes(15), 30);
        let result = validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            std::slice::from_ref(&conflict),
            &BookingPolicy {
                require_slot_alignment: false,
                ..POLICY
            },
            None,
        );
        assert!(matches!(result, Err(BookingError::SlotTaken)));
    }

    #[test]
    fn update_by_non_owner_is_rejected_last() {
        let start = tomorrow_at(9, 0);
        let window = window_on(start.date_naive(), "09:00:00", "12:00:00", 30);
        let existing = appointment_at(start, 30);

        let result = validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            Some(&UpdateContext {
                existing: &existing,
                caller: Uuid::new_v4(),
            }),
        );
        assert!(matches!(result, Err(BookingError::NotOwner)));

        validate_booking(
            start,
            start + Duration::minutes(30),
            Utc::now(),
            std::slice::from_ref(&window),
            &[],
            &POLICY,
            Some(&UpdateContext {
                existing: &existing,
                caller: existing.patient_id,
            }),
        )
        .expect("owner may reschedule");
    }
}
