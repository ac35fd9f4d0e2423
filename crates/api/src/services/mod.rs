//! External service integrations.

pub mod email;
pub mod hibp;
pub mod notifier;

pub use email::{EmailError, EmailService};
pub use hibp::{HibpClient, HibpClientError};
pub use notifier::EmailBreachNotifier;
