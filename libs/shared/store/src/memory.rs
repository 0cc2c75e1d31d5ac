use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::schedule::{Appointment, AvailabilityWindow, DayKey, Doctor, Patient};

use crate::error::StoreError;
use crate::traits::{AppointmentStore, AvailabilityStore, DoctorStore, PatientStore};

#[derive(Default)]
struct Inner {
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
    windows: HashMap<Uuid, AvailabilityWindow>,
    appointments: HashMap<Uuid, Appointment>,
}

/// In-process implementation of the repository traits. A single `RwLock`
/// guards all tables; `insert_if_free`/`update_if_free` hold the write guard
/// across the overlap scan and the write, which is what makes the booking
/// commit path atomic under concurrent requests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_overlap(
    inner: &Inner,
    doctor_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> bool {
    inner.appointments.values().any(|existing| {
        existing.doctor_id == doctor_id
            && Some(existing.id) != exclude
            && existing.overlaps_range(start, end)
    })
}

#[async_trait]
impl DoctorStore for MemoryStore {
    async fn insert_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.doctors.contains_key(&doctor.id) {
            return Err(StoreError::Conflict);
        }
        inner.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(self.inner.read().await.doctors.get(&id).cloned())
    }

    async fn update_doctor(&self, doctor: Doctor) -> Result<Doctor, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.doctors.contains_key(&doctor.id) {
            return Err(StoreError::NotFound);
        }
        inner.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
        approved_only: bool,
    ) -> Result<Vec<Doctor>, StoreError> {
        let inner = self.inner.read().await;
        let mut doctors: Vec<Doctor> = inner
            .doctors
            .values()
            .filter(|doctor| !approved_only || doctor.is_approved)
            .filter(|doctor| {
                name.map_or(true, |term| {
                    doctor.full_name.to_lowercase().contains(&term.to_lowercase())
                })
            })
            .filter(|doctor| {
                specialty.map_or(true, |term| {
                    doctor.specialty.to_lowercase().contains(&term.to_lowercase())
                })
            })
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(doctors)
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn insert_patient(&self, patient: Patient) -> Result<Patient, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.patients.contains_key(&patient.id) {
            return Err(StoreError::Conflict);
        }
        inner.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(self.inner.read().await.patients.get(&id).cloned())
    }

    async fn update_patient(&self, patient: Patient) -> Result<Patient, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.patients.contains_key(&patient.id) {
            return Err(StoreError::NotFound);
        }
        inner.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn insert_window(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityWindow, StoreError> {
        let mut inner = self.inner.write().await;
        inner.windows.insert(window.id, window.clone());
        Ok(window)
    }

    async fn window(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, StoreError> {
        Ok(self.inner.read().await.windows.get(&id).cloned())
    }

    async fn update_window(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityWindow, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.windows.contains_key(&window.id) {
            return Err(StoreError::NotFound);
        }
        inner.windows.insert(window.id, window.clone());
        Ok(window)
    }

    async fn delete_window(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.windows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn windows_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<AvailabilityWindow>, StoreError> {
        let inner = self.inner.read().await;
        let mut windows: Vec<AvailabilityWindow> = inner
            .windows
            .values()
            .filter(|window| window.doctor_id == doctor_id)
            .cloned()
            .collect();
        windows.sort_by_key(|window| window.start_time);
        Ok(windows)
    }

    async fn windows_for_day(
        &self,
        doctor_id: Uuid,
        day: DayKey,
    ) -> Result<Vec<AvailabilityWindow>, StoreError> {
        let inner = self.inner.read().await;
        let mut windows: Vec<AvailabilityWindow> = inner
            .windows
            .values()
            .filter(|window| window.doctor_id == doctor_id && window.day_key() == day)
            .cloned()
            .collect();
        windows.sort_by_key(|window| window.start_time);
        Ok(windows)
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert_if_free(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;
        if has_overlap(
            &inner,
            appointment.doctor_id,
            appointment.start_time,
            appointment.end_time,
            None,
        ) {
            return Err(StoreError::Conflict);
        }
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_if_free(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound);
        }
        if has_overlap(
            &inner,
            appointment.doctor_id,
            appointment.start_time,
            appointment.end_time,
            Some(appointment.id),
        ) {
            return Err(StoreError::Conflict);
        }
        inner.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn remove_appointment(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let mut inner = self.inner.write().await;
        inner.appointments.remove(&id).ok_or(StoreError::NotFound)
    }

    async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.inner.read().await.appointments.get(&id).cloned())
    }

    async fn overlapping(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|existing| {
                existing.doctor_id == doctor_id
                    && Some(existing.id) != exclude
                    && existing.overlaps_range(start, end)
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.start_time);
        Ok(appointments)
    }

    async fn appointments_for_doctor_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| {
                appointment.doctor_id == doctor_id && appointment.date() == date
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.start_time);
        Ok(appointments)
    }

    async fn appointments_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| appointment.doctor_id == doctor_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.start_time);
        Ok(appointments)
    }

    async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| appointment.patient_id == patient_id)
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.start_time);
        Ok(appointments)
    }
}
