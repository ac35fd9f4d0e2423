//! Domain models for Breach Watch.

pub mod breach;
pub mod owner;
pub mod scheduler_setting;

pub use breach::{BreachKey, BreachRecord, BreachResponse, BreachedSite};
pub use owner::{CreateMonitoredEmailRequest, MonitoredEmailResponse, MonitoredOwner};
pub use scheduler_setting::{
    IntervalError, IntervalUnit, PwnCheckInterval, SchedulerSetting, SchedulerSettingsResponse,
    UpdateSchedulerSettingsRequest, PWN_CHECK_INTERVAL_UNIT_KEY, PWN_CHECK_INTERVAL_VALUE_KEY,
};
