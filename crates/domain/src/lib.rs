//! Domain layer for the Breach Watch backend.
//!
//! This crate contains:
//! - Domain models (MonitoredOwner, BreachRecord, scheduler settings)
//! - The breach deduplication engine
//! - Collaborator traits the breach check depends on (stores, notifier, lookup)
//! - Domain error types

pub mod models;
pub mod services;
