use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(handlers::search_doctors_public))
        .route("/{doctor_id}", get(handlers::get_doctor_public));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/{doctor_id}", put(handlers::update_doctor))
        .route("/{doctor_id}/approve", patch(handlers::approve_doctor))
        .route("/{doctor_id}/availability", get(handlers::list_availability))
        .route("/{doctor_id}/availability", post(handlers::declare_availability))
        .route("/{doctor_id}/availability/{window_id}", put(handlers::update_availability))
        .route("/{doctor_id}/availability/{window_id}", delete(handlers::delete_availability))
        .route("/{doctor_id}/slots", get(handlers::get_available_slots))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
