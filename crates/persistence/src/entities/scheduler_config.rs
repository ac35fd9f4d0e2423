//! Scheduler configuration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the scheduler_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct SchedulerConfigEntity {
    pub id: i32,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl From<SchedulerConfigEntity> for domain::models::SchedulerSetting {
    fn from(entity: SchedulerConfigEntity) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            updated_at: entity.updated_at,
        }
    }
}
