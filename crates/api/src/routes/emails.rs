//! Monitored email address endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    BreachRecord, BreachResponse, CreateMonitoredEmailRequest, MonitoredEmailResponse,
    MonitoredOwner,
};
use persistence::repositories::{BreachRepository, MonitoredEmailRepository};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ListEmailsResponse {
    pub emails: Vec<MonitoredEmailResponse>,
}

#[derive(Debug, Serialize)]
pub struct ListBreachesResponse {
    pub email_id: i64,
    pub breaches: Vec<BreachResponse>,
}

/// List monitored addresses with their stored breach counts.
///
/// GET /api/v1/emails
pub async fn list_emails(
    State(state): State<AppState>,
) -> Result<Json<ListEmailsResponse>, ApiError> {
    let repo = MonitoredEmailRepository::new(state.pool.clone());
    let emails = repo
        .list_with_breach_counts()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListEmailsResponse { emails }))
}

/// Start monitoring an address.
///
/// POST /api/v1/emails
pub async fn create_email(
    State(state): State<AppState>,
    Json(request): Json<CreateMonitoredEmailRequest>,
) -> Result<(StatusCode, Json<MonitoredEmailResponse>), ApiError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let repo = MonitoredEmailRepository::new(state.pool.clone());

    if repo.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Email '{}' is already monitored",
            email
        )));
    }

    let owner: MonitoredOwner = repo.create(&email).await?.into();
    info!(email_id = owner.id, "Monitored email added");

    Ok((
        StatusCode::CREATED,
        Json(MonitoredEmailResponse {
            id: owner.id,
            email: owner.email,
            created_at: owner.created_at,
            breach_count: 0,
        }),
    ))
}

/// Stop monitoring an address. Its stored breaches are removed with it.
///
/// DELETE /api/v1/emails/:id
pub async fn delete_email(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let repo = MonitoredEmailRepository::new(state.pool.clone());
    if repo.delete(id).await? == 0 {
        return Err(ApiError::NotFound(format!("Monitored email {} not found", id)));
    }

    info!(email_id = id, "Monitored email removed");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct DeleteAllEmailsResponse {
    pub deleted: u64,
}

/// Stop monitoring every address, together with their stored breaches.
///
/// DELETE /api/v1/emails/all
pub async fn delete_all_emails(
    State(state): State<AppState>,
) -> Result<Json<DeleteAllEmailsResponse>, ApiError> {
    let deleted = MonitoredEmailRepository::new(state.pool.clone())
        .delete_all()
        .await?;

    info!(deleted, "All monitored emails removed");
    Ok(Json(DeleteAllEmailsResponse { deleted }))
}

/// Stored breaches for one address.
///
/// GET /api/v1/emails/:id/breaches
pub async fn list_breaches(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ListBreachesResponse>, ApiError> {
    let owners = MonitoredEmailRepository::new(state.pool.clone());
    if owners.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Monitored email {} not found", id)));
    }

    let breaches = BreachRepository::new(state.pool.clone())
        .find_by_email_id(id)
        .await?
        .into_iter()
        .map(|entity| BreachResponse::from(BreachRecord::from(entity)))
        .collect();

    Ok(Json(ListBreachesResponse {
        email_id: id,
        breaches,
    }))
}
