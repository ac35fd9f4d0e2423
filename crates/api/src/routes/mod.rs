//! HTTP route handlers.

pub mod breaches;
pub mod emails;
pub mod health;
pub mod scheduler;
