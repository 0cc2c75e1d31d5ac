use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_models::schedule::Patient;
use shared_store::{AppState, PatientStore, StoreError};

use crate::models::{CreatePatientRequest, PatientError, UpdatePatientRequest};

pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            patients: state.patients.clone(),
        }
    }

    /// Create the patient profile for a freshly registered identity.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient profile for user {}", user_id);

        let now = Utc::now();
        let patient = Patient {
            id: user_id,
            full_name: request.full_name,
            email: email.unwrap_or_default(),
            age: request.age,
            contact: request.contact,
            created_at: now,
            updated_at: now,
        };

        self.patients.insert_patient(patient).await.map_err(|e| match e {
            StoreError::Conflict => PatientError::AlreadyExists,
            other => PatientError::Store(other.to_string()),
        })
    }

    /// Profiles are private: only the owning patient may read their own.
    pub async fn get(&self, caller: Uuid, id: Uuid) -> Result<Patient, PatientError> {
        if caller != id {
            return Err(PatientError::NotOwner);
        }

        self.patients
            .patient(id)
            .await
            .map_err(store_error)?
            .ok_or(PatientError::NotFound)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        let mut patient = self.get(caller, id).await?;

        if let Some(full_name) = request.full_name {
            patient.full_name = full_name;
        }
        if let Some(age) = request.age {
            patient.age = Some(age);
        }
        if let Some(contact) = request.contact {
            patient.contact = Some(contact);
        }
        patient.updated_at = Utc::now();

        self.patients.update_patient(patient).await.map_err(store_error)
    }
}

fn store_error(e: StoreError) -> PatientError {
    match e {
        StoreError::NotFound => PatientError::NotFound,
        other => PatientError::Store(other.to_string()),
    }
}
