use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use doctor_cell::models::CreateDoctorRequest;
use doctor_cell::services::profile::DoctorService;
use patient_cell::models::CreatePatientRequest;
use patient_cell::services::patient::PatientService;
use shared_models::auth::{Principal, User};
use shared_models::error::AppError;
use shared_store::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterProfileRequest {
    pub full_name: String,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub age: Option<u32>,
    pub contact: Option<String>,
}

/// Registration hook for the identity collaborator: once a user exists, this
/// creates the matching role profile. Profile creation is an explicit call
/// here, not a side effect of identity writes.
#[axum::debug_handler]
pub async fn register_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<RegisterProfileRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let profile = match principal {
        Principal::Doctor(id) => {
            let doctor_service = DoctorService::new(&state);
            let doctor = doctor_service
                .create_profile(
                    id,
                    user.email,
                    CreateDoctorRequest {
                        full_name: request.full_name,
                        specialty: request.specialty,
                        bio: request.bio,
                        contact: request.contact,
                    },
                )
                .await
                .map_err(AppError::from)?;
            json!(doctor)
        }
        Principal::Patient(id) => {
            let patient_service = PatientService::new(&state);
            let patient = patient_service
                .create_profile(
                    id,
                    user.email,
                    CreatePatientRequest {
                        full_name: request.full_name,
                        age: request.age,
                        contact: request.contact,
                    },
                )
                .await
                .map_err(AppError::from)?;
            json!(patient)
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "profile": profile
        })),
    ))
}
