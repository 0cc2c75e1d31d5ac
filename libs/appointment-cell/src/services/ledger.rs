use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use notification_cell::Notifier;
use shared_models::auth::Principal;
use shared_models::schedule::{Appointment, AvailabilityWindow, DayKey};
use shared_store::{
    AppState, AppointmentStore, AvailabilityStore, DoctorStore, PatientStore, StoreError,
};

use crate::models::{
    AppointmentQueryParams, BookAppointmentRequest, BookingError, RescheduleAppointmentRequest,
};
use crate::services::validator::{validate_booking, BookingPolicy, UpdateContext};

/// Single writer of appointment state. Every mutation validates against a
/// read snapshot first, then commits through the store's check-and-insert so
/// the overlap rule also holds under concurrent requests.
pub struct LedgerService {
    doctors: Arc<dyn DoctorStore>,
    patients: Arc<dyn PatientStore>,
    availability: Arc<dyn AvailabilityStore>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: Notifier,
    policy: BookingPolicy,
}

impl LedgerService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: state.doctors.clone(),
            patients: state.patients.clone(),
            availability: state.availability.clone(),
            appointments: state.appointments.clone(),
            notifier: state.notifier.clone(),
            policy: BookingPolicy {
                default_slot_minutes: state.config.default_slot_minutes,
                require_slot_alignment: state.config.require_slot_alignment,
            },
        }
    }

    pub async fn book(
        &self,
        caller: Principal,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let Principal::Patient(patient_id) = caller else {
            return Err(BookingError::NotOwner);
        };

        debug!(
            "Booking appointment for patient {} with doctor {}",
            patient_id, request.doctor_id
        );

        let doctor = self
            .doctors
            .doctor(request.doctor_id)
            .await
            .map_err(store_error)?
            .filter(|doctor| doctor.is_approved)
            .ok_or(BookingError::DoctorNotFound)?;

        let patient = self
            .patients
            .patient(patient_id)
            .await
            .map_err(store_error)?
            .ok_or(BookingError::PatientNotFound)?;

        let windows = self
            .windows_covering(doctor.id, request.start_time.date_naive())
            .await?;
        let conflicts = self
            .appointments
            .overlapping(doctor.id, request.start_time, request.end_time, None)
            .await
            .map_err(store_error)?;

        validate_booking(
            request.start_time,
            request.end_time,
            Utc::now(),
            &windows,
            &conflicts,
            &self.policy,
            None,
        )?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id,
            start_time: request.start_time,
            end_time: request.end_time,
            created_at: now,
            updated_at: now,
        };

        let appointment = self
            .appointments
            .insert_if_free(appointment)
            .await
            .map_err(|e| match e {
                StoreError::Conflict => BookingError::SlotTaken,
                other => store_error(other),
            })?;

        info!(
            "Appointment {} booked with doctor {} from {} to {}",
            appointment.id, doctor.id, appointment.start_time, appointment.end_time
        );

        self.notifier
            .booking_confirmed(&appointment, &doctor, &patient)
            .await;

        Ok(appointment)
    }

    /// Reschedule an appointment. Rules 1-4 are re-validated with the
    /// appointment's own prior interval excluded, so moving it onto its
    /// current slot succeeds.
    pub async fn reschedule(
        &self,
        caller: Principal,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        debug!("Rescheduling appointment: {}", appointment_id);

        let existing = self
            .appointments
            .appointment(appointment_id)
            .await
            .map_err(store_error)?
            .ok_or(BookingError::NotFound)?;

        let windows = self
            .windows_covering(existing.doctor_id, request.start_time.date_naive())
            .await?;
        let conflicts = self
            .appointments
            .overlapping(
                existing.doctor_id,
                request.start_time,
                request.end_time,
                Some(appointment_id),
            )
            .await
            .map_err(store_error)?;

        validate_booking(
            request.start_time,
            request.end_time,
            Utc::now(),
            &windows,
            &conflicts,
            &self.policy,
            Some(&UpdateContext {
                existing: &existing,
                caller: caller.id(),
            }),
        )?;

        let mut updated = existing;
        updated.start_time = request.start_time;
        updated.end_time = request.end_time;
        updated.updated_at = Utc::now();

        let updated = self
            .appointments
            .update_if_free(updated)
            .await
            .map_err(|e| match e {
                StoreError::Conflict => BookingError::SlotTaken,
                other => store_error(other),
            })?;

        info!(
            "Appointment {} rescheduled to {} - {}",
            updated.id, updated.start_time, updated.end_time
        );
        Ok(updated)
    }

    /// Cancel an appointment. Allowed to the owning patient or the doctor
    /// side of the booking; the cancellation notice is best-effort and never
    /// undoes the removal.
    pub async fn cancel(
        &self,
        caller: Principal,
        appointment_id: Uuid,
    ) -> Result<Appointment, BookingError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let existing = self
            .appointments
            .appointment(appointment_id)
            .await
            .map_err(store_error)?
            .ok_or(BookingError::NotFound)?;

        let authorized = match caller {
            Principal::Patient(id) => id == existing.patient_id,
            Principal::Doctor(id) => id == existing.doctor_id,
        };
        if !authorized {
            return Err(BookingError::NotOwner);
        }

        let removed = self
            .appointments
            .remove_appointment(appointment_id)
            .await
            .map_err(store_error)?;

        info!("Appointment {} cancelled", removed.id);

        match (
            self.doctors.doctor(removed.doctor_id).await,
            self.patients.patient(removed.patient_id).await,
        ) {
            (Ok(Some(doctor)), Ok(Some(patient))) => {
                self.notifier
                    .booking_cancelled(&removed, &doctor, &patient)
                    .await;
            }
            _ => warn!(
                "Skipping cancellation notice for appointment {}: party profile unavailable",
                removed.id
            ),
        }

        Ok(removed)
    }

    pub async fn get(
        &self,
        caller: Principal,
        appointment_id: Uuid,
    ) -> Result<Appointment, BookingError> {
        let appointment = self
            .appointments
            .appointment(appointment_id)
            .await
            .map_err(store_error)?
            .ok_or(BookingError::NotFound)?;

        let authorized = match caller {
            Principal::Patient(id) => id == appointment.patient_id,
            Principal::Doctor(id) => id == appointment.doctor_id,
        };
        if !authorized {
            return Err(BookingError::NotOwner);
        }

        Ok(appointment)
    }

    /// The caller's own appointments, optionally narrowed to a date range.
    pub async fn list_for(
        &self,
        caller: Principal,
        query: AppointmentQueryParams,
    ) -> Result<Vec<Appointment>, BookingError> {
        let mut appointments = match caller {
            Principal::Patient(id) => self
                .appointments
                .appointments_for_patient(id)
                .await
                .map_err(store_error)?,
            Principal::Doctor(id) => self
                .appointments
                .appointments_for_doctor(id)
                .await
                .map_err(store_error)?,
        };

        if let Some(from) = query.from {
            appointments.retain(|appointment| appointment.start_time >= from);
        }
        if let Some(to) = query.to {
            appointments.retain(|appointment| appointment.start_time <= to);
        }

        Ok(appointments)
    }

    /// Windows that can cover a given date: the dated ones pinned to it plus
    /// the recurring ones on its weekday.
    async fn windows_covering(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityWindow>, BookingError> {
        let mut windows = self
            .availability
            .windows_for_day(doctor_id, DayKey::Date(date))
            .await
            .map_err(store_error)?;
        windows.extend(
            self.availability
                .windows_for_day(doctor_id, DayKey::Weekday(date.weekday()))
                .await
                .map_err(store_error)?,
        );
        Ok(windows)
    }
}

fn store_error(e: StoreError) -> BookingError {
    match e {
        StoreError::NotFound => BookingError::NotFound,
        other => BookingError::Store(other.to_string()),
    }
}
