//! Repository implementations for database operations.

pub mod breach;
pub mod monitored_email;
pub mod scheduler_config;

pub use breach::BreachRepository;
pub use monitored_email::MonitoredEmailRepository;
pub use scheduler_config::SchedulerConfigRepository;
