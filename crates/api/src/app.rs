use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::jobs::BreachCheckScheduler;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{breaches, emails, health, scheduler};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub breach_scheduler: Arc<BreachCheckScheduler>,
}

pub fn create_app(config: Config, pool: PgPool, breach_scheduler: Arc<BreachCheckScheduler>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        breach_scheduler,
    };

    let api_routes = Router::new()
        .route(
            "/api/v1/scheduler/settings",
            get(scheduler::get_settings).put(scheduler::update_settings),
        )
        .route("/api/v1/scheduler/status", get(scheduler::get_status))
        .route(
            "/api/v1/emails",
            get(emails::list_emails).post(emails::create_email),
        )
        .route("/api/v1/emails/all", delete(emails::delete_all_emails))
        .route("/api/v1/emails/:id", delete(emails::delete_email))
        .route("/api/v1/emails/:id/breaches", get(emails::list_breaches))
        .route(
            "/api/v1/breaches",
            get(breaches::list_all_breaches).delete(breaches::delete_all_breaches),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Global middleware (order matters: bottom layers run first)
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}
