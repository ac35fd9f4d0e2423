//! Scheduler configuration repository.

use sqlx::PgPool;

use domain::services::{SchedulerConfigStore, StoreError};

use crate::entities::SchedulerConfigEntity;
use crate::metrics::QueryTimer;

/// Repository for key/value scheduler settings.
#[derive(Clone)]
pub struct SchedulerConfigRepository {
    pool: PgPool,
}

impl SchedulerConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting by key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<SchedulerConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_scheduler_config");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(
            r#"
            SELECT id, key, value, updated_at
            FROM scheduler_configs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Insert or update a setting, touching `updated_at`.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<SchedulerConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_scheduler_config");
        let result = sqlx::query_as::<_, SchedulerConfigEntity>(
            r#"
            INSERT INTO scheduler_configs (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            RETURNING id, key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Insert or update several settings in one transaction.
    pub async fn upsert_many(&self, entries: &[(&str, String)]) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_scheduler_configs_batch");
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO scheduler_configs (key, value, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (key) DO UPDATE SET
                    value = EXCLUDED.value,
                    updated_at = NOW()
                "#,
            )
            .bind(*key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }
}

#[async_trait::async_trait]
impl SchedulerConfigStore for SchedulerConfigRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.find_by_key(key)
            .await
            .map(|row| row.map(|entity| entity.value))
            .map_err(|e| StoreError::new("get_value", e.to_string()))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.upsert(key, value)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::new("set_value", e.to_string()))
    }

    async fn set_values(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.upsert_many(entries)
            .await
            .map_err(|e| StoreError::new("set_values", e.to_string()))
    }
}
