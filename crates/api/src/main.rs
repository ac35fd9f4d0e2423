use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use breachwatch_api::{
    app, config,
    jobs::{BreachCheckJob, BreachCheckScheduler, JobScheduler, PoolMetricsJob, POOL_METRICS_FREQUENCY},
    middleware,
    services::{EmailBreachNotifier, EmailService, HibpClient},
};
use domain::services::PwnCheckSettings;
use persistence::repositories::{BreachRepository, MonitoredEmailRepository, SchedulerConfigRepository};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Breach Watch v{}", env!("CARGO_PKG_VERSION"));

    let db_config = persistence::db::DatabaseConfig::from(&config.database);
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    if config.hibp.api_key.trim().is_empty() {
        warn!("HIBP API key is not configured; breach lookups will fail until it is set");
    }

    let hibp = Arc::new(HibpClient::new(&config.hibp)?);
    let email = EmailService::new(config.email.clone());
    if !email.is_enabled() {
        warn!("Email alerts are disabled; new breaches will be stored without notification");
    }
    let notifier = Arc::new(EmailBreachNotifier::new(email));
    let breach_check = Arc::new(BreachCheckJob::new(
        Arc::new(MonitoredEmailRepository::new(pool.clone())),
        Arc::new(BreachRepository::new(pool.clone())),
        hibp,
        notifier,
        Duration::from_secs(config.hibp.rate_limit_wait_secs),
    ));

    let scheduler = Arc::new(JobScheduler::new());
    scheduler.add_job(
        "pool_metrics",
        Arc::new(PoolMetricsJob::new(pool.clone())),
        POOL_METRICS_FREQUENCY,
    )?;

    let breach_scheduler = Arc::new(BreachCheckScheduler::new(
        scheduler.clone(),
        PwnCheckSettings::new(Arc::new(SchedulerConfigRepository::new(pool.clone()))),
        breach_check,
    ));
    breach_scheduler.init().await?;

    let app = app::create_app(config.clone(), pool, breach_scheduler);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(Duration::from_secs(config.scheduler.shutdown_timeout_secs))
        .await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
