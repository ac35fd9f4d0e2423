//! Breach repository for database operations.

use sqlx::PgPool;

use domain::models::BreachRecord;
use domain::services::{BreachStore, StoreError};

use crate::entities::BreachEntity;
use crate::metrics::QueryTimer;

/// Repository for stored breach records.
#[derive(Clone)]
pub struct BreachRepository {
    pool: PgPool,
}

impl BreachRepository {
    /// Creates a new BreachRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Breaches stored for one monitored address, most recent breach first.
    pub async fn find_by_email_id(&self, email_id: i64) -> Result<Vec<BreachEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_breaches_by_email_id");
        let result = sqlx::query_as::<_, BreachEntity>(
            r#"
            SELECT id, email_id, name, title, domain, breach_date, added_date,
                   description, is_verified, data_classes, created_at
            FROM breaches
            WHERE email_id = $1
            ORDER BY breach_date DESC, name
            "#,
        )
        .bind(email_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Insert a batch of breaches in one transaction.
    ///
    /// Rows whose `(email_id, name, breach_date)` already exist are skipped.
    /// Returns the number of rows actually inserted.
    pub async fn insert_many(&self, records: &[BreachRecord]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("insert_breaches_batch");
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for record in records {
            let data_classes: Vec<String> = record.data_classes.iter().cloned().collect();
            let result = sqlx::query(
                r#"
                INSERT INTO breaches (
                    email_id, name, title, domain, breach_date, added_date,
                    description, is_verified, data_classes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (email_id, name, breach_date) DO NOTHING
                "#,
            )
            .bind(record.owner_id)
            .bind(&record.name)
            .bind(&record.title)
            .bind(&record.domain)
            .bind(record.breach_date)
            .bind(record.added_date)
            .bind(&record.description)
            .bind(record.is_verified)
            .bind(&data_classes)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        timer.record();
        tracing::debug!(inserted, attempted = records.len(), "Stored breach batch");
        Ok(inserted)
    }

    /// Every stored breach across all monitored addresses.
    pub async fn list_all(&self) -> Result<Vec<BreachEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_breaches");
        let result = sqlx::query_as::<_, BreachEntity>(
            r#"
            SELECT id, email_id, name, title, domain, breach_date, added_date,
                   description, is_verified, data_classes, created_at
            FROM breaches
            ORDER BY email_id, breach_date DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Clears all stored breaches. Returns the number of rows removed.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_all_breaches");
        let result = sqlx::query("DELETE FROM breaches")
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }
}

#[async_trait::async_trait]
impl BreachStore for BreachRepository {
    async fn get_breaches_by_owner(&self, owner_id: i64) -> Result<Vec<BreachRecord>, StoreError> {
        self.find_by_email_id(owner_id)
            .await
            .map(|rows| rows.into_iter().map(BreachRecord::from).collect())
            .map_err(|e| StoreError::new("get_breaches_by_owner", e.to_string()))
    }

    async fn insert_breaches(&self, records: &[BreachRecord]) -> Result<u64, StoreError> {
        self.insert_many(records)
            .await
            .map_err(|e| StoreError::new("insert_breaches", e.to_string()))
    }
}
