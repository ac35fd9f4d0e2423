//! Background job to record connection pool metrics.

use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// How often pool gauges are refreshed.
pub const POOL_METRICS_FREQUENCY: JobFrequency = JobFrequency::Seconds(15);

/// Job that periodically records database connection pool metrics.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_metrics_frequency() {
        assert_eq!(POOL_METRICS_FREQUENCY.duration().as_secs(), 15);
        assert_eq!(POOL_METRICS_FREQUENCY.to_string(), "interval[15 seconds]");
    }
}
