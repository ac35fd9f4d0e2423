//! Domain services for Breach Watch.
//!
//! Services contain business logic that operates on domain models, plus the
//! collaborator traits the breach check is written against.

pub mod dedup;
pub mod notification;
pub mod scheduler_config;
pub mod stores;

pub use dedup::dedup;

pub use notification::{
    render_breach_alert, BreachNotifier, MockBreachNotifier, NotificationResult,
    RecordedNotification, BREACH_ALERT_SUBJECT,
};

pub use scheduler_config::{PwnCheckSettings, SettingsError};

pub use stores::{
    BreachLookupError, BreachSource, BreachStore, LookupErrorKind, OwnerStore,
    SchedulerConfigStore, StoreError,
};
