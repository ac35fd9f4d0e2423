//! Stored breach endpoints.
//!
//! Breaches are only ever written by the breach check; over HTTP they can be
//! listed or cleared in bulk.

use axum::{extract::State, Json};
use domain::models::{BreachRecord, BreachResponse};
use persistence::repositories::BreachRepository;
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct StoredBreachResponse {
    pub email_id: i64,
    #[serde(flatten)]
    pub breach: BreachResponse,
}

#[derive(Debug, Serialize)]
pub struct ListAllBreachesResponse {
    pub breaches: Vec<StoredBreachResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

impl From<BreachRecord> for StoredBreachResponse {
    fn from(record: BreachRecord) -> Self {
        Self {
            email_id: record.owner_id,
            breach: record.into(),
        }
    }
}

/// GET /api/v1/breaches
pub async fn list_all_breaches(
    State(state): State<AppState>,
) -> Result<Json<ListAllBreachesResponse>, ApiError> {
    let breaches = BreachRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|entity| StoredBreachResponse::from(BreachRecord::from(entity)))
        .collect();

    Ok(Json(ListAllBreachesResponse { breaches }))
}

/// Clear every stored breach.
///
/// DELETE /api/v1/breaches
pub async fn delete_all_breaches(
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = BreachRepository::new(state.pool.clone()).delete_all().await?;
    info!(deleted, "Cleared stored breaches");
    Ok(Json(DeletedResponse { deleted }))
}
