use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQueryParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Start time must be before end time")]
    InvalidInterval,

    #[error("Appointment must be scheduled in the future")]
    NotInFuture,

    #[error("The doctor is not available at the requested time")]
    OutsideAvailability,

    #[error("The doctor already has an appointment in this time range")]
    SlotTaken,

    #[error("Not authorized to act on this appointment")]
    NotOwner,

    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Storage error: {0}")]
    Store(String),
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::InvalidInterval
            | BookingError::NotInFuture
            | BookingError::OutsideAvailability
            | BookingError::SlotTaken => AppError::BadRequest(e.to_string()),
            BookingError::NotOwner => AppError::Forbidden(e.to_string()),
            BookingError::NotFound
            | BookingError::DoctorNotFound
            | BookingError::PatientNotFound => AppError::NotFound(e.to_string()),
            BookingError::Store(msg) => AppError::Internal(msg),
        }
    }
}
