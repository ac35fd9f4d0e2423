//! Breach check schedule endpoints.

use axum::{extract::State, Json};
use domain::models::{SchedulerSettingsResponse, UpdateSchedulerSettingsRequest};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::jobs::JobInfo;

#[derive(Debug, Serialize)]
pub struct SchedulerStatusResponse {
    pub jobs: Vec<JobInfo>,
}

/// GET /api/v1/scheduler/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SchedulerSettingsResponse>, ApiError> {
    let settings = state.breach_scheduler.get_settings().await?;
    Ok(Json(settings))
}

/// Change the breach check interval.
///
/// PUT /api/v1/scheduler/settings
///
/// Invalid units or non-positive values are rejected with 400 before anything
/// is persisted.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSchedulerSettingsRequest>,
) -> Result<Json<SchedulerSettingsResponse>, ApiError> {
    let settings = state
        .breach_scheduler
        .update_settings(&request.interval_unit, request.interval_value)
        .await?;

    info!(
        interval_unit = %settings.interval_unit,
        interval_value = settings.interval_value,
        "Scheduler settings updated"
    );

    Ok(Json(settings))
}

/// GET /api/v1/scheduler/status
pub async fn get_status(State(state): State<AppState>) -> Json<SchedulerStatusResponse> {
    Json(SchedulerStatusResponse {
        jobs: state.breach_scheduler.get_status(),
    })
}
