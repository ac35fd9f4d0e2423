//! Typed access to the persisted breach check schedule.

use std::sync::Arc;

use shared::validation::validate_positive_interval;
use thiserror::Error;

use crate::models::{
    IntervalError, IntervalUnit, PwnCheckInterval, PWN_CHECK_INTERVAL_UNIT_KEY,
    PWN_CHECK_INTERVAL_VALUE_KEY,
};
use crate::services::stores::{SchedulerConfigStore, StoreError};

/// Errors from reading or changing the breach check schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error(transparent)]
    Invalid(#[from] IntervalError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Settings were valid but the running schedule could not be updated.
    #[error("Failed to update breach check schedule: {0}")]
    UpdateFailed(String),
}

impl SettingsError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SettingsError::Invalid(_))
    }
}

/// Reads and writes the two breach check interval settings.
#[derive(Clone)]
pub struct PwnCheckSettings {
    store: Arc<dyn SchedulerConfigStore>,
}

impl PwnCheckSettings {
    pub fn new(store: Arc<dyn SchedulerConfigStore>) -> Self {
        Self { store }
    }

    /// Returns the stored value for `key`, or `default` when it is not set.
    pub async fn get_value(&self, key: &str, default: &str) -> Result<String, StoreError> {
        Ok(self
            .store
            .get_value(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Writes the default interval for every key that has no value yet.
    /// Existing values are left alone.
    pub async fn ensure_defaults(&self) -> Result<(), StoreError> {
        let defaults = PwnCheckInterval::default();
        let entries = [
            (PWN_CHECK_INTERVAL_UNIT_KEY, defaults.unit.to_string()),
            (PWN_CHECK_INTERVAL_VALUE_KEY, defaults.value.to_string()),
        ];

        for (key, value) in entries {
            if self.store.get_value(key).await?.is_none() {
                tracing::info!(key = %key, value = %value, "Creating default scheduler setting");
                self.store.set_value(key, &value).await?;
            }
        }
        Ok(())
    }

    /// Current interval.
    ///
    /// Missing or unparseable stored values fall back to the default for that
    /// half of the interval.
    pub async fn interval(&self) -> Result<PwnCheckInterval, StoreError> {
        let defaults = PwnCheckInterval::default();

        let raw_unit = self
            .get_value(PWN_CHECK_INTERVAL_UNIT_KEY, defaults.unit.as_str())
            .await?;
        let raw_value = self
            .get_value(PWN_CHECK_INTERVAL_VALUE_KEY, &defaults.value.to_string())
            .await?;

        let unit = raw_unit.parse::<IntervalUnit>().unwrap_or_else(|_| {
            tracing::warn!(value = %raw_unit, "Stored interval unit is invalid, using default");
            defaults.unit
        });
        let value = match raw_value.trim().parse::<i64>() {
            Ok(value) if validate_positive_interval(value).is_ok() => value as u64,
            _ => {
                tracing::warn!(value = %raw_value, "Stored interval value is invalid, using default");
                defaults.value
            }
        };

        Ok(PwnCheckInterval { unit, value })
    }

    /// Persists both halves of `interval` together.
    pub async fn set_interval(&self, interval: PwnCheckInterval) -> Result<(), StoreError> {
        self.store
            .set_values(&[
                (PWN_CHECK_INTERVAL_UNIT_KEY, interval.unit.to_string()),
                (PWN_CHECK_INTERVAL_VALUE_KEY, interval.value.to_string()),
            ])
            .await
    }
}
