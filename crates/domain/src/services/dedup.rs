//! Breach deduplication.

use std::collections::HashSet;

use crate::models::{BreachKey, BreachRecord};

/// Returns the fetched records that are not already known.
///
/// Records are matched on `(name, breach_date)` only. Breach dates are
/// normalized to calendar dates when the provider payload is parsed, so a
/// timestamped date and a plain date for the same day compare equal here.
/// The result keeps the fetched order and contains each key at most once.
pub fn dedup(existing: &[BreachRecord], fetched: Vec<BreachRecord>) -> Vec<BreachRecord> {
    let mut seen: HashSet<BreachKey> = existing.iter().map(BreachRecord::key).collect();

    fetched
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}
