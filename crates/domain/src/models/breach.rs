//! Breach domain models.
//!
//! `BreachedSite` mirrors one entry of the provider's `breachedaccount`
//! response. `BreachRecord` is what gets stored against a monitored owner.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::dates::{deserialize_breach_date, deserialize_provider_timestamp};

/// Identity of a breach record: the breach source and the date it happened.
///
/// Two records with the same key are the same breach, whatever else differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BreachKey {
    pub name: String,
    pub breach_date: NaiveDate,
}

/// One breach event observed for one monitored owner.
///
/// Equality and hashing only look at `(name, breach_date)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachRecord {
    pub owner_id: i64,
    pub name: String,
    pub title: String,
    pub domain: String,
    pub breach_date: NaiveDate,
    pub added_date: DateTime<Utc>,
    pub description: String,
    pub is_verified: bool,
    pub data_classes: BTreeSet<String>,
}

impl BreachRecord {
    pub fn key(&self) -> BreachKey {
        BreachKey {
            name: self.name.clone(),
            breach_date: self.breach_date,
        }
    }
}

impl PartialEq for BreachRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.breach_date == other.breach_date
    }
}

impl Eq for BreachRecord {}

impl Hash for BreachRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.breach_date.hash(state);
    }
}

/// A breached site as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BreachedSite {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(deserialize_with = "deserialize_breach_date")]
    pub breach_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_provider_timestamp")]
    pub added_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pwn_count: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub disclosure_url: Option<String>,
    #[serde(default)]
    pub data_classes: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_fabricated: bool,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub is_retired: bool,
    #[serde(default)]
    pub is_spam_list: bool,
    #[serde(default)]
    pub is_malware: bool,
    #[serde(default)]
    pub is_subscription_free: bool,
    #[serde(default)]
    pub is_stealer_log: bool,
}

impl BreachedSite {
    /// Converts the provider entry into a record owned by `owner_id`.
    pub fn into_record(self, owner_id: i64) -> BreachRecord {
        BreachRecord {
            owner_id,
            name: self.name,
            title: self.title,
            domain: self.domain,
            breach_date: self.breach_date,
            added_date: self.added_date,
            description: self.description,
            is_verified: self.is_verified,
            data_classes: self.data_classes.into_iter().collect(),
        }
    }
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => shared::dates::parse_provider_timestamp(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Breach record as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BreachResponse {
    pub name: String,
    pub title: String,
    pub domain: String,
    pub breach_date: NaiveDate,
    pub added_date: DateTime<Utc>,
    pub description: String,
    pub is_verified: bool,
    pub data_classes: Vec<String>,
}

impl From<BreachRecord> for BreachResponse {
    fn from(record: BreachRecord) -> Self {
        Self {
            name: record.name,
            title: record.title,
            domain: record.domain,
            breach_date: record.breach_date,
            added_date: record.added_date,
            description: record.description,
            is_verified: record.is_verified,
            data_classes: record.data_classes.into_iter().collect(),
        }
    }
}
