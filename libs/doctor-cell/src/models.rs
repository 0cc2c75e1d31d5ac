use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::schedule::WindowSchedule;

pub const MIN_SLOT_MINUTES: i64 = 5;
pub const MAX_SLOT_MINUTES: i64 = 240;

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub full_name: String,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorSearchQuery {
    pub name: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeclareWindowRequest {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(flatten)]
    pub schedule: WindowSchedule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWindowRequest {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
}

/// A generated slot projected onto a concrete date, annotated for patients
/// browsing a doctor's day. `is_booked` uses exact-interval matching; the
/// stricter overlap rule only applies at booking time.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub is_available: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Start time must be before end time")]
    InvalidInterval,

    #[error("Availability date must not be in the past")]
    PastDate,

    #[error("Slot duration must be between {MIN_SLOT_MINUTES} and {MAX_SLOT_MINUTES} minutes")]
    InvalidSlotDuration,

    #[error("Window overlaps an existing availability window")]
    OverlappingWindow,

    #[error("Only the owning doctor may modify this window")]
    NotOwner,

    #[error("Availability window not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Store(String),
}

impl From<AvailabilityError> for AppError {
    fn from(e: AvailabilityError) -> Self {
        match e {
            AvailabilityError::InvalidInterval
            | AvailabilityError::PastDate
            | AvailabilityError::InvalidSlotDuration
            | AvailabilityError::OverlappingWindow => AppError::BadRequest(e.to_string()),
            AvailabilityError::NotOwner => AppError::Forbidden(e.to_string()),
            AvailabilityError::NotFound => AppError::NotFound(e.to_string()),
            AvailabilityError::Store(msg) => AppError::Internal(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor profile already exists")]
    AlreadyExists,

    #[error("Only the owner may modify this profile")]
    NotOwner,

    #[error("Storage error: {0}")]
    Store(String),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound => AppError::NotFound(e.to_string()),
            ProfileError::AlreadyExists => AppError::BadRequest(e.to_string()),
            ProfileError::NotOwner => AppError::Forbidden(e.to_string()),
            ProfileError::Store(msg) => AppError::Internal(msg),
        }
    }
}
