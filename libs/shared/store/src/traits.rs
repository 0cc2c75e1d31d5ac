use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_models::schedule::{Appointment, AvailabilityWindow, DayKey, Doctor, Patient};

use crate::error::StoreError;

/// Repository seams for the persistence collaborator. The scheduling services
/// only ever talk to these traits, so they can be exercised against the
/// in-memory store in tests.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn insert_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError>;
    async fn doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;
    async fn update_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError>;
    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
        approved_only: bool,
    ) -> Result<Vec<Doctor>, StoreError>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn insert_patient(&self, patient: Patient) -> Result<Patient, StoreError>;
    async fn patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
    async fn update_patient(&self, patient: Patient) -> Result<Patient, StoreError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn insert_window(&self, window: AvailabilityWindow)
        -> Result<AvailabilityWindow, StoreError>;
    async fn window(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, StoreError>;
    async fn update_window(&self, window: AvailabilityWindow)
        -> Result<AvailabilityWindow, StoreError>;
    async fn delete_window(&self, id: Uuid) -> Result<(), StoreError>;
    async fn windows_for_doctor(&self, doctor_id: Uuid)
        -> Result<Vec<AvailabilityWindow>, StoreError>;
    async fn windows_for_day(
        &self,
        doctor_id: Uuid,
        day: DayKey,
    ) -> Result<Vec<AvailabilityWindow>, StoreError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Atomic check-and-insert: the overlap scan and the write happen in one
    /// critical section, so of two racing bookings for the same doctor the
    /// loser fails with [`StoreError::Conflict`].
    async fn insert_if_free(&self, appointment: Appointment)
        -> Result<Appointment, StoreError>;

    /// Same guarantee for reschedules; the record's own prior interval is
    /// excluded from the scan.
    async fn update_if_free(&self, appointment: Appointment)
        -> Result<Appointment, StoreError>;

    async fn remove_appointment(&self, id: Uuid) -> Result<Appointment, StoreError>;
    async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;
    async fn overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn appointments_for_doctor_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn appointments_for_doctor(&self, doctor_id: Uuid)
        -> Result<Vec<Appointment>, StoreError>;
    async fn appointments_for_patient(&self, patient_id: Uuid)
        -> Result<Vec<Appointment>, StoreError>;
}
