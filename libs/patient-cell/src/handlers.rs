use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::UpdatePatientRequest;
use crate::services::patient::PatientService;

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let Principal::Patient(caller) = principal else {
        return Err(AppError::Forbidden("Only patients may access patient profiles".to_string()));
    };

    let patient_service = PatientService::new(&state);
    let patient = patient_service.get(caller, patient_id).await.map_err(AppError::from)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let Principal::Patient(caller) = principal else {
        return Err(AppError::Forbidden("Only patients may edit patient profiles".to_string()));
    };

    let patient_service = PatientService::new(&state);
    let patient = patient_service
        .update(caller, patient_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(patient)))
}
