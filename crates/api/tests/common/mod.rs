//! Common test utilities for integration tests.
//!
//! These helpers run against a real PostgreSQL database named by
//! `TEST_DATABASE_URL`. When the variable is not set, tests return early.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use breachwatch_api::{
    app::create_app,
    config::{Config, DatabaseConfig, EmailConfig, HibpConfig, LoggingConfig, SchedulerConfig, ServerConfig},
    jobs::{BreachCheckJob, BreachCheckScheduler, JobScheduler},
};
use domain::models::BreachedSite;
use domain::services::{BreachLookupError, BreachSource, MockBreachNotifier, PwnCheckSettings};
use persistence::repositories::{BreachRepository, MonitoredEmailRepository, SchedulerConfigRepository};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Connect to the test database, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL").unwrap_or_default(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        hibp: HibpConfig::default(),
        email: EmailConfig::default(),
        scheduler: SchedulerConfig::default(),
    }
}

/// Breach source that answers from a fixed table keyed by address.
#[derive(Default)]
pub struct StaticBreachSource {
    pub responses: Vec<(String, Vec<BreachedSite>)>,
}

#[async_trait]
impl BreachSource for StaticBreachSource {
    async fn breached_account(
        &self,
        email: &str,
    ) -> Result<Option<Vec<BreachedSite>>, BreachLookupError> {
        Ok(self
            .responses
            .iter()
            .find(|(e, _)| e == email)
            .map(|(_, sites)| sites.clone()))
    }
}

/// Build a breach check job wired to real repositories.
pub fn breach_check_job(
    pool: &PgPool,
    source: StaticBreachSource,
    notifier: MockBreachNotifier,
) -> BreachCheckJob {
    BreachCheckJob::new(
        Arc::new(MonitoredEmailRepository::new(pool.clone())),
        Arc::new(BreachRepository::new(pool.clone())),
        Arc::new(source),
        Arc::new(notifier),
        Duration::ZERO,
    )
}

/// Build the app with a started breach check scheduler.
pub async fn create_test_app(pool: PgPool) -> Router {
    let job = breach_check_job(&pool, StaticBreachSource::default(), MockBreachNotifier::new());
    let breach_scheduler = Arc::new(BreachCheckScheduler::new(
        Arc::new(JobScheduler::new()),
        PwnCheckSettings::new(Arc::new(SchedulerConfigRepository::new(pool.clone()))),
        Arc::new(job),
    ));
    breach_scheduler
        .init()
        .await
        .expect("Failed to start breach scheduler");

    create_app(test_config(), pool, breach_scheduler)
}

pub fn site(name: &str, breach_date: &str) -> BreachedSite {
    serde_json::from_value(serde_json::json!({
        "Name": name,
        "Title": name,
        "Domain": format!("{}.com", name.to_lowercase()),
        "BreachDate": breach_date,
        "AddedDate": "2020-01-01T00:00:00Z",
        "Description": format!("{} was breached", name),
        "DataClasses": ["Email addresses", "Passwords"],
        "IsVerified": true
    }))
    .expect("valid breach fixture")
}

/// Remove all rows so each test starts clean.
pub async fn cleanup_all_test_data(pool: &PgPool) {
    for table in ["breaches", "monitored_emails", "scheduler_configs"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(pool)
            .await
            .expect("Failed to clean up test data");
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}
