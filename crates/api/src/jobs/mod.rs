//! Background job scheduler and job implementations.

mod breach_check;
mod breach_schedule;
mod pool_metrics;
mod scheduler;

pub use breach_check::{BreachCheckJob, BreachCheckSummary, OwnerOutcome, BREACH_CHECK_JOB_NAME};
pub use breach_schedule::{BreachCheckScheduler, PWN_CHECK_JOB_ID};
pub use pool_metrics::{PoolMetricsJob, POOL_METRICS_FREQUENCY};
pub use scheduler::{Job, JobFrequency, JobInfo, JobScheduler, SchedulerError};
