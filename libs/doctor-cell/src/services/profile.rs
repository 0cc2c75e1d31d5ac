use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::schedule::Doctor;
use shared_store::{AppState, DoctorStore, StoreError};

use crate::models::{CreateDoctorRequest, DoctorSearchQuery, ProfileError, UpdateDoctorRequest};

pub struct DoctorService {
    doctors: Arc<dyn DoctorStore>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: state.doctors.clone(),
        }
    }

    /// Create the doctor profile for a freshly registered identity. New
    /// profiles start unapproved and are invisible to patients until the
    /// approval flag is flipped.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        request: CreateDoctorRequest,
    ) -> Result<Doctor, ProfileError> {
        debug!("Creating doctor profile for user {}", user_id);

        let now = Utc::now();
        let doctor = Doctor {
            id: user_id,
            full_name: request.full_name,
            email: email.unwrap_or_default(),
            specialty: request.specialty.unwrap_or_default(),
            bio: request.bio,
            contact: request.contact,
            is_approved: false,
            created_at: now,
            updated_at: now,
        };

        self.doctors.insert_doctor(doctor).await.map_err(|e| match e {
            StoreError::Conflict => ProfileError::AlreadyExists,
            other => ProfileError::Store(other.to_string()),
        })
    }

    /// Fetch a doctor. Unapproved doctors are only visible to themselves;
    /// everyone else gets not-found rather than a hint the profile exists.
    pub async fn get(&self, viewer: Option<&Principal>, id: Uuid) -> Result<Doctor, ProfileError> {
        let doctor = self
            .doctors
            .doctor(id)
            .await
            .map_err(store_error)?
            .ok_or(ProfileError::NotFound)?;

        let is_owner = matches!(viewer, Some(Principal::Doctor(owner)) if *owner == id);
        if !doctor.is_approved && !is_owner {
            return Err(ProfileError::NotFound);
        }

        Ok(doctor)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, ProfileError> {
        if caller != id {
            return Err(ProfileError::NotOwner);
        }

        let mut doctor = self
            .doctors
            .doctor(id)
            .await
            .map_err(store_error)?
            .ok_or(ProfileError::NotFound)?;

        if let Some(full_name) = request.full_name {
            doctor.full_name = full_name;
        }
        if let Some(specialty) = request.specialty {
            doctor.specialty = specialty;
        }
        if let Some(bio) = request.bio {
            doctor.bio = Some(bio);
        }
        if let Some(contact) = request.contact {
            doctor.contact = Some(contact);
        }
        doctor.updated_at = Utc::now();

        self.doctors.update_doctor(doctor).await.map_err(store_error)
    }

    /// Flip the approval flag. Exposed for the admin collaborator; approval
    /// is what makes a doctor listable and bookable.
    pub async fn approve(&self, id: Uuid) -> Result<Doctor, ProfileError> {
        let mut doctor = self
            .doctors
            .doctor(id)
            .await
            .map_err(store_error)?
            .ok_or(ProfileError::NotFound)?;

        doctor.is_approved = true;
        doctor.updated_at = Utc::now();

        let doctor = self.doctors.update_doctor(doctor).await.map_err(store_error)?;
        info!("Doctor {} approved", doctor.id);
        Ok(doctor)
    }

    /// Public directory search over approved doctors.
    pub async fn search(&self, query: DoctorSearchQuery) -> Result<Vec<Doctor>, ProfileError> {
        self.doctors
            .search_doctors(query.name.as_deref(), query.specialty.as_deref(), true)
            .await
            .map_err(store_error)
    }
}

fn store_error(e: StoreError) -> ProfileError {
    match e {
        StoreError::NotFound => ProfileError::NotFound,
        other => ProfileError::Store(other.to_string()),
    }
}
