//! Shared utilities and common types for the Breach Watch backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Normalization of breach-provider date formats
//! - Common validation logic

pub mod dates;
pub mod validation;
