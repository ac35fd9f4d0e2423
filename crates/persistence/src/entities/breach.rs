//! Breach entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database row mapping for the breaches table.
#[derive(Debug, Clone, FromRow)]
pub struct BreachEntity {
    pub id: i64,
    pub email_id: i64,
    pub name: String,
    pub title: String,
    pub domain: String,
    pub breach_date: NaiveDate,
    pub added_date: DateTime<Utc>,
    pub description: String,
    pub is_verified: bool,
    pub data_classes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BreachEntity> for domain::models::BreachRecord {
    fn from(entity: BreachEntity) -> Self {
        Self {
            owner_id: entity.email_id,
            name: entity.name,
            title: entity.title,
            domain: entity.domain,
            breach_date: entity.breach_date,
            added_date: entity.added_date,
            description: entity.description,
            is_verified: entity.is_verified,
            data_classes: entity.data_classes.into_iter().collect(),
        }
    }
}
