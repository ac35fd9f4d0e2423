//! Monitored email repository for database operations.

use sqlx::PgPool;

use domain::models::MonitoredOwner;
use domain::services::{OwnerStore, StoreError};

use crate::entities::{MonitoredEmailEntity, MonitoredEmailSummaryEntity};
use crate::metrics::QueryTimer;

/// Repository for monitored email addresses.
#[derive(Clone)]
pub struct MonitoredEmailRepository {
    pool: PgPool,
}

impl MonitoredEmailRepository {
    /// Creates a new MonitoredEmailRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// All monitored addresses, oldest first.
    pub async fn list(&self) -> Result<Vec<MonitoredEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_monitored_emails");
        let result = sqlx::query_as::<_, MonitoredEmailEntity>(
            r#"
            SELECT id, email, created_at
            FROM monitored_emails
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// All monitored addresses with the number of breaches stored for each.
    pub async fn list_with_breach_counts(
        &self,
    ) -> Result<Vec<MonitoredEmailSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_monitored_emails_with_counts");
        let result = sqlx::query_as::<_, MonitoredEmailSummaryEntity>(
            r#"
            SELECT m.id, m.email, m.created_at, COUNT(b.id) AS breach_count
            FROM monitored_emails m
            LEFT JOIN breaches b ON b.email_id = m.id
            GROUP BY m.id, m.email, m.created_at
            ORDER BY m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find a monitored address by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<MonitoredEmailEntity>, sqlx::Error> {
        sqlx::query_as::<_, MonitoredEmailEntity>(
            r#"
            SELECT id, email, created_at
            FROM monitored_emails
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a monitored address by email, case-insensitively.
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<MonitoredEmailEntity>, sqlx::Error> {
        sqlx::query_as::<_, MonitoredEmailEntity>(
            r#"
            SELECT id, email, created_at
            FROM monitored_emails
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Start monitoring an address.
    ///
    /// Fails with a unique violation if the address is already monitored.
    pub async fn create(&self, email: &str) -> Result<MonitoredEmailEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_monitored_email");
        let result = sqlx::query_as::<_, MonitoredEmailEntity>(
            r#"
            INSERT INTO monitored_emails (email)
            VALUES ($1)
            RETURNING id, email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Stop monitoring an address. Its stored breaches are removed with it.
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_monitored_email");
        let result = sqlx::query(
            r#"
            DELETE FROM monitored_emails
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Stop monitoring every address. Stored breaches cascade with them.
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_all_monitored_emails");
        let result = sqlx::query("DELETE FROM monitored_emails")
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl OwnerStore for MonitoredEmailRepository {
    async fn get_all_owners(&self) -> Result<Vec<MonitoredOwner>, StoreError> {
        self.list()
            .await
            .map(|rows| rows.into_iter().map(MonitoredOwner::from).collect())
            .map_err(|e| StoreError::new("get_all_owners", e.to_string()))
    }
}
