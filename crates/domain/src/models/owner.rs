//! Monitored owner domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_email_address;
use validator::Validate;

/// A monitored email address. Breach records hang off its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitoredOwner {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for adding a monitored email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMonitoredEmailRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
}

/// A monitored address together with how many breaches are stored for it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitoredEmailResponse {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub breach_count: i64,
}
