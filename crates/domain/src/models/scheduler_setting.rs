//! Scheduler setting domain models.
//!
//! The breach check interval is persisted as two string settings, a unit and
//! a value, so the schedule survives restarts and can be changed at runtime.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_positive_interval, MAX_INTERVAL_VALUE};
use thiserror::Error;

/// Setting key holding the breach check interval unit.
pub const PWN_CHECK_INTERVAL_UNIT_KEY: &str = "pwn_check_interval_unit";

/// Setting key holding the breach check interval value.
pub const PWN_CHECK_INTERVAL_VALUE_KEY: &str = "pwn_check_interval_value";

/// Errors raised while validating a requested schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Interval unit must be one of: seconds, minutes, hours, days (got '{0}')")]
    InvalidUnit(String),

    #[error("Interval value must be greater than 0 (got {0})")]
    InvalidValue(i64),

    #[error("Interval value cannot exceed {max} (got {0})", max = MAX_INTERVAL_VALUE)]
    TooLarge(i64),
}

/// Unit of the breach check interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    pub const ALL: [IntervalUnit; 4] = [
        IntervalUnit::Seconds,
        IntervalUnit::Minutes,
        IntervalUnit::Hours,
        IntervalUnit::Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalUnit {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntervalUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| IntervalError::InvalidUnit(s.to_string()))
    }
}

/// A validated breach check interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PwnCheckInterval {
    pub unit: IntervalUnit,
    pub value: u64,
}

impl PwnCheckInterval {
    pub fn new(unit: IntervalUnit, value: u64) -> Result<Self, IntervalError> {
        if value == 0 {
            return Err(IntervalError::InvalidValue(0));
        }
        if value > MAX_INTERVAL_VALUE as u64 {
            return Err(IntervalError::TooLarge(i64::try_from(value).unwrap_or(i64::MAX)));
        }
        Ok(Self { unit, value })
    }

    /// Validates raw input as it arrives from a settings update.
    ///
    /// The unit is checked first, so a request with both a bad unit and a bad
    /// value reports the unit.
    pub fn parse(unit: &str, value: i64) -> Result<Self, IntervalError> {
        let unit = IntervalUnit::from_str(unit)?;
        validate_positive_interval(value).map_err(|_| {
            if value > MAX_INTERVAL_VALUE {
                IntervalError::TooLarge(value)
            } else {
                IntervalError::InvalidValue(value)
            }
        })?;
        Self::new(unit, value as u64)
    }
}

impl Default for PwnCheckInterval {
    fn default() -> Self {
        Self {
            unit: IntervalUnit::Hours,
            value: 1,
        }
    }
}

impl fmt::Display for PwnCheckInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A persisted key/value scheduler setting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerSetting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Scheduler settings as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerSettingsResponse {
    pub interval_unit: IntervalUnit,
    pub interval_value: u64,
}

impl From<PwnCheckInterval> for SchedulerSettingsResponse {
    fn from(interval: PwnCheckInterval) -> Self {
        Self {
            interval_unit: interval.unit,
            interval_value: interval.value,
        }
    }
}

/// Request payload for changing the breach check interval.
///
/// The unit is kept as a free string so that unknown units reach validation
/// and produce a descriptive error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateSchedulerSettingsRequest {
    pub interval_unit: String,
    pub interval_value: i64,
}
