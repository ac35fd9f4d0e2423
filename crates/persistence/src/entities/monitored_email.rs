//! Monitored email entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the monitored_emails table.
#[derive(Debug, Clone, FromRow)]
pub struct MonitoredEmailEntity {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<MonitoredEmailEntity> for domain::models::MonitoredOwner {
    fn from(entity: MonitoredEmailEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            created_at: entity.created_at,
        }
    }
}

/// Monitored email joined with its stored breach count.
#[derive(Debug, Clone, FromRow)]
pub struct MonitoredEmailSummaryEntity {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub breach_count: i64,
}

impl From<MonitoredEmailSummaryEntity> for domain::models::MonitoredEmailResponse {
    fn from(entity: MonitoredEmailSummaryEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            created_at: entity.created_at,
            breach_count: entity.breach_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::MonitoredOwner;

    #[test]
    fn test_entity_to_owner() {
        let now = Utc::now();
        let entity = MonitoredEmailEntity {
            id: 12,
            email: "a@x.com".to_string(),
            created_at: now,
        };

        let owner: MonitoredOwner = entity.into();
        assert_eq!(owner.id, 12);
        assert_eq!(owner.email, "a@x.com");
        assert_eq!(owner.created_at, now);
    }

    #[test]
    fn test_summary_to_response() {
        let entity = MonitoredEmailSummaryEntity {
            id: 1,
            email: "b@x.com".to_string(),
            created_at: Utc::now(),
            breach_count: 4,
        };

        let response: domain::models::MonitoredEmailResponse = entity.into();
        assert_eq!(response.breach_count, 4);
    }
}
