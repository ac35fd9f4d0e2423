//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod breach;
pub mod monitored_email;
pub mod scheduler_config;

pub use breach::BreachEntity;
pub use monitored_email::{MonitoredEmailEntity, MonitoredEmailSummaryEntity};
pub use scheduler_config::SchedulerConfigEntity;
