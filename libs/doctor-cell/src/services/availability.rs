use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::Principal;
use shared_models::schedule::{AvailabilityWindow, WindowSchedule};
use shared_store::{AppState, AvailabilityStore, StoreError};

use crate::models::{
    AvailabilityError, DeclareWindowRequest, UpdateWindowRequest, MAX_SLOT_MINUTES,
    MIN_SLOT_MINUTES,
};

pub struct AvailabilityService {
    windows: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            windows: state.availability.clone(),
        }
    }

    /// Declare a new availability window for a doctor. The window is checked
    /// against every existing window of the same doctor sharing its day key
    /// before it is persisted.
    pub async fn declare(
        &self,
        doctor_id: Uuid,
        request: DeclareWindowRequest,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        debug!("Declaring availability window for doctor {}", doctor_id);

        validate_window_shape(request.start_time, request.end_time, &request.schedule)?;

        let now = Utc::now();
        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            schedule: request.schedule,
            created_at: now,
            updated_at: now,
        };

        self.check_window_conflicts(&window, None).await?;

        let created = self
            .windows
            .insert_window(window)
            .await
            .map_err(store_error)?;

        debug!("Availability window created with ID: {}", created.id);
        Ok(created)
    }

    /// Update the time range of an existing window. Only the owning doctor
    /// may update; the overlap scan excludes the window itself.
    pub async fn update(
        &self,
        caller: Uuid,
        window_id: Uuid,
        request: UpdateWindowRequest,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        debug!("Updating availability window: {}", window_id);

        let mut window = self
            .windows
            .window(window_id)
            .await
            .map_err(store_error)?
            .ok_or(AvailabilityError::NotFound)?;

        if window.doctor_id != caller {
            return Err(AvailabilityError::NotOwner);
        }

        if let Some(start) = request.start_time {
            window.start_time = start;
        }
        if let Some(end) = request.end_time {
            window.end_time = end;
        }

        validate_window_shape(window.start_time, window.end_time, &window.schedule)?;
        self.check_window_conflicts(&window, Some(window_id)).await?;

        window.updated_at = Utc::now();
        self.windows.update_window(window).await.map_err(store_error)
    }

    /// Delete a window. Cross-owner attempts fail with the authorization
    /// error even though the record exists.
    pub async fn delete(&self, caller: Uuid, window_id: Uuid) -> Result<(), AvailabilityError> {
        debug!("Deleting availability window: {}", window_id);

        let window = self
            .windows
            .window(window_id)
            .await
            .map_err(store_error)?
            .ok_or(AvailabilityError::NotFound)?;

        if window.doctor_id != caller {
            return Err(AvailabilityError::NotOwner);
        }

        self.windows.delete_window(window_id).await.map_err(store_error)
    }

    /// List a doctor's windows. The owner sees everything for audit; other
    /// callers only see windows that can still produce bookable slots.
    pub async fn list(
        &self,
        viewer: &Principal,
        doctor_id: Uuid,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        let mut windows = self
            .windows
            .windows_for_doctor(doctor_id)
            .await
            .map_err(store_error)?;

        let is_owner = matches!(viewer, Principal::Doctor(id) if *id == doctor_id);
        if !is_owner {
            let today = Utc::now().date_naive();
            windows.retain(|window| match window.schedule {
                WindowSchedule::Recurring { .. } => true,
                WindowSchedule::Dated { date, .. } => date >= today,
            });
        }

        Ok(windows)
    }

    async fn check_window_conflicts(
        &self,
        candidate: &AvailabilityWindow,
        exclude: Option<Uuid>,
    ) -> Result<(), AvailabilityError> {
        let existing = self
            .windows
            .windows_for_day(candidate.doctor_id, candidate.day_key())
            .await
            .map_err(store_error)?;

        let conflict = existing
            .iter()
            .any(|window| Some(window.id) != exclude && window.overlaps(candidate));

        if conflict {
            return Err(AvailabilityError::OverlappingWindow);
        }

        Ok(())
    }
}

fn validate_window_shape(
    start: chrono::NaiveTime,
    end: chrono::NaiveTime,
    schedule: &WindowSchedule,
) -> Result<(), AvailabilityError> {
    if start >= end {
        return Err(AvailabilityError::InvalidInterval);
    }

    if let WindowSchedule::Dated { date, slot_minutes } = schedule {
        if *date < Utc::now().date_naive() {
            return Err(AvailabilityError::PastDate);
        }
        if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(slot_minutes) {
            return Err(AvailabilityError::InvalidSlotDuration);
        }
    }

    Ok(())
}

fn store_error(e: StoreError) -> AvailabilityError {
    match e {
        StoreError::NotFound => AvailabilityError::NotFound,
        other => AvailabilityError::Store(other.to_string()),
    }
}
