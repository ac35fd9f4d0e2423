//! Collaborator contracts used by the breach check.
//!
//! The breach check only talks to storage, the breach provider and the
//! notifier through these traits. The persistence crate implements the store
//! traits on PostgreSQL and the api crate implements `BreachSource` on top of
//! the HIBP HTTP API.

use thiserror::Error;

use crate::models::{BreachRecord, BreachedSite, MonitoredOwner};

/// A store operation failed. Nothing is assumed to have been written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Store operation '{operation}' failed: {message}")]
pub struct StoreError {
    pub operation: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Coarse classification of a failed breach lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupErrorKind {
    /// No credential is configured locally.
    Configuration,
    /// The provider rejected the credential.
    Authentication,
    /// The provider answered with an unexpected status or could not be reached.
    Transport,
}

impl LookupErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupErrorKind::Configuration => "configuration_error",
            LookupErrorKind::Authentication => "authentication_failure",
            LookupErrorKind::Transport => "transport_failure",
        }
    }
}

/// Errors returned by a breach lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BreachLookupError {
    #[error("No Hibp Key Found. Please make sure that your key exists in your environment.")]
    NotConfigured,

    #[error("Your API could not be verified by the hibp platform. Make sure your subscription exists.")]
    Unauthorized,

    /// The provider answered with a status other than 200, 401 or 404.
    #[error("Breach provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// The request never produced a response (DNS, connect, reset).
    #[error("Breach provider unreachable: {0}")]
    Unreachable(String),

    #[error("Breach provider request timed out")]
    Timeout,

    /// A 200 response whose body could not be parsed.
    #[error("Invalid breach provider response: {0}")]
    InvalidResponse(String),
}

impl BreachLookupError {
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            BreachLookupError::NotConfigured => LookupErrorKind::Configuration,
            BreachLookupError::Unauthorized => LookupErrorKind::Authentication,
            BreachLookupError::Provider { .. }
            | BreachLookupError::Unreachable(_)
            | BreachLookupError::Timeout
            | BreachLookupError::InvalidResponse(_) => LookupErrorKind::Transport,
        }
    }

    /// True when the provider never answered.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            BreachLookupError::Unreachable(_) | BreachLookupError::Timeout
        )
    }
}

/// Looks up the breaches an address appears in.
#[async_trait::async_trait]
pub trait BreachSource: Send + Sync {
    /// Returns `Ok(None)` when the provider knows no breach for the address.
    async fn breached_account(
        &self,
        email: &str,
    ) -> Result<Option<Vec<BreachedSite>>, BreachLookupError>;
}

/// Read access to the monitored addresses.
#[async_trait::async_trait]
pub trait OwnerStore: Send + Sync {
    /// All monitored owners in a stable order.
    async fn get_all_owners(&self) -> Result<Vec<MonitoredOwner>, StoreError>;
}

/// Breach records per owner.
#[async_trait::async_trait]
pub trait BreachStore: Send + Sync {
    async fn get_breaches_by_owner(&self, owner_id: i64) -> Result<Vec<BreachRecord>, StoreError>;

    /// Inserts all records or none of them. Returns the number of rows written.
    async fn insert_breaches(&self, records: &[BreachRecord]) -> Result<u64, StoreError>;
}

/// Key/value scheduler settings.
#[async_trait::async_trait]
pub trait SchedulerConfigStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Writes several keys. Implementations backed by a database should do
    /// this in a single transaction.
    async fn set_values(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set_value(key, value).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_kinds() {
        assert_eq!(
            BreachLookupError::NotConfigured.kind(),
            LookupErrorKind::Configuration
        );
        assert_eq!(
            BreachLookupError::Unauthorized.kind(),
            LookupErrorKind::Authentication
        );
        assert_eq!(
            BreachLookupError::Provider {
                status: 503,
                body: "busy".into()
            }
            .kind(),
            LookupErrorKind::Transport
        );
        assert_eq!(BreachLookupError::Timeout.kind(), LookupErrorKind::Transport);
    }

    #[test]
    fn test_network_failures_are_distinguishable() {
        let provider = BreachLookupError::Provider {
            status: 500,
            body: String::new(),
        };
        assert!(!provider.is_network_failure());
        assert!(BreachLookupError::Unreachable("connection reset".into()).is_network_failure());
        assert!(BreachLookupError::Timeout.is_network_failure());
    }

    #[test]
    fn test_lookup_error_messages() {
        assert_eq!(
            BreachLookupError::NotConfigured.to_string(),
            "No Hibp Key Found. Please make sure that your key exists in your environment."
        );
        assert_eq!(
            BreachLookupError::Provider {
                status: 429,
                body: "slow down".into()
            }
            .to_string(),
            "Breach provider returned status 429: slow down"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::new("insert_breaches", "connection refused");
        assert_eq!(
            err.to_string(),
            "Store operation 'insert_breaches' failed: connection refused"
        );
    }
}
