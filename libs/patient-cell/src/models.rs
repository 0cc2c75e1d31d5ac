use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub age: Option<u32>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePatientRequest {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub contact: Option<String>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient profile already exists")]
    AlreadyExists,

    #[error("Only the owner may access this profile")]
    NotOwner,

    #[error("Storage error: {0}")]
    Store(String),
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::AlreadyExists => AppError::BadRequest(e.to_string()),
            PatientError::NotOwner => AppError::Forbidden(e.to_string()),
            PatientError::Store(msg) => AppError::Internal(msg),
        }
    }
}
