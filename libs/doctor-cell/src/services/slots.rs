use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_models::schedule::{Appointment, AvailabilityWindow, DayKey, Slot};
use shared_store::{AppState, AppointmentStore, AvailabilityStore, StoreError};

use crate::models::{AvailabilityError, SlotView};

/// Walk a window in slot-size increments. Pure and restartable: the same
/// window always yields the same slots. A trailing remainder shorter than
/// one slot is dropped.
pub fn generate(window: &AvailabilityWindow, default_slot_minutes: i64) -> Vec<Slot> {
    let step = Duration::minutes(window.slot_minutes(default_slot_minutes));
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut current = window.start_time;
    while window.end_time.signed_duration_since(current) >= step {
        let slot_end = current + step;
        slots.push(Slot {
            start_time: current,
            end_time: slot_end,
        });
        current = slot_end;
    }
    slots
}

/// Project a window's slots onto a concrete date and mark each one. A slot
/// is booked when an existing appointment matches its interval exactly, and
/// unavailable once its start is no longer in the future.
pub fn available_slots(
    window: &AvailabilityWindow,
    date: NaiveDate,
    booked: &[Appointment],
    now: DateTime<Utc>,
    default_slot_minutes: i64,
) -> Vec<SlotView> {
    generate(window, default_slot_minutes)
        .into_iter()
        .map(|slot| {
            let start_time = date.and_time(slot.start_time).and_utc();
            let end_time = date.and_time(slot.end_time).and_utc();
            let is_booked = booked
                .iter()
                .any(|appt| appt.start_time == start_time && appt.end_time == end_time);
            let is_available = !is_booked && start_time > now;
            SlotView {
                start_time,
                end_time,
                is_booked,
                is_available,
            }
        })
        .collect()
}

pub struct SlotService {
    availability: Arc<dyn AvailabilityStore>,
    appointments: Arc<dyn AppointmentStore>,
    default_slot_minutes: i64,
}

impl SlotService {
    pub fn new(state: &AppState) -> Self {
        Self {
            availability: state.availability.clone(),
            appointments: state.appointments.clone(),
            default_slot_minutes: state.config.default_slot_minutes,
        }
    }

    /// All slots a doctor offers on a date, across every window covering that
    /// date's day key, in ascending order.
    pub async fn slots_for_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<SlotView>, AvailabilityError> {
        debug!("Calculating slots for doctor {} on {}", doctor_id, date);

        let booked = self
            .appointments
            .appointments_for_doctor_on(doctor_id, date)
            .await
            .map_err(store_error)?;

        let now = Utc::now();
        let mut views = Vec::new();
        for day_key in [DayKey::Date(date), DayKey::Weekday(date.weekday())] {
            let windows = self
                .availability
                .windows_for_day(doctor_id, day_key)
                .await
                .map_err(store_error)?;
            for window in &windows {
                views.extend(available_slots(
                    window,
                    date,
                    &booked,
                    now,
                    self.default_slot_minutes,
                ));
            }
        }

        views.sort_by_key(|view| view.start_time);

        debug!("Found {} slots", views.len());
        Ok(views)
    }
}

fn store_error(e: StoreError) -> AvailabilityError {
    match e {
        StoreError::NotFound => AvailabilityError::NotFound,
        other => AvailabilityError::Store(other.to_string()),
    }
}
