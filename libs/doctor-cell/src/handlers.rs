use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    DeclareWindowRequest, DoctorSearchQuery, SlotQuery, UpdateDoctorRequest, UpdateWindowRequest,
};
use crate::services::{
    availability::AvailabilityService, profile::DoctorService, slots::SlotService,
};

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors_public(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.search(query).await.map_err(AppError::from)?;
    let total = doctors.len();

    Ok(Json(json!({
        "doctors": doctors,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_public(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get(None, doctor_id).await.map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let Principal::Doctor(caller) = principal else {
        return Err(AppError::Forbidden("Only doctors may edit a doctor profile".to_string()));
    };

    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service
        .update(caller, doctor_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

/// Hook for the (external) admin surface: flips the approval flag that makes
/// a doctor listable and bookable.
#[axum::debug_handler]
pub async fn approve_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.approve(doctor_id).await.map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let windows = availability_service
        .list(&principal, doctor_id)
        .await
        .map_err(AppError::from)?;
    let total = windows.len();

    Ok(Json(json!({
        "availability": windows,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn declare_availability(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<DeclareWindowRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if principal != Principal::Doctor(doctor_id) {
        return Err(AppError::Forbidden(
            "Only the owning doctor may declare availability".to_string(),
        ));
    }

    let availability_service = AvailabilityService::new(&state);
    let window = availability_service
        .declare(doctor_id, request)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(json!(window))))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((_doctor_id, window_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateWindowRequest>,
) -> Result<Json<Value>, AppError> {
    let Principal::Doctor(caller) = principal else {
        return Err(AppError::Forbidden(
            "Only the owning doctor may update availability".to_string(),
        ));
    };

    let availability_service = AvailabilityService::new(&state);
    let window = availability_service
        .update(caller, window_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(window)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((_doctor_id, window_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let Principal::Doctor(caller) = principal else {
        return Err(AppError::Forbidden(
            "Only the owning doctor may delete availability".to_string(),
        ));
    };

    let availability_service = AvailabilityService::new(&state);
    availability_service
        .delete(caller, window_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    // Slot listings follow profile visibility: unapproved doctors stay hidden.
    let doctor_service = DoctorService::new(&state);
    doctor_service
        .get(Some(&principal), doctor_id)
        .await
        .map_err(AppError::from)?;

    let slot_service = SlotService::new(&state);
    let slots = slot_service
        .slots_for_date(doctor_id, query.date)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "slots": slots
    })))
}
