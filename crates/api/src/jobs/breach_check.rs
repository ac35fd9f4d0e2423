//! Background job that checks every monitored address for new breaches.
//!
//! Per owner: look up breaches, drop the ones already stored, persist the
//! rest, then notify. Failures are contained to the owner they happen on.

use std::sync::Arc;
use std::time::Duration;

use domain::models::{BreachRecord, MonitoredOwner};
use domain::services::{
    dedup, BreachNotifier, BreachSource, BreachStore, LookupErrorKind, NotificationResult,
    OwnerStore,
};
use tracing::{error, info, warn};

use super::scheduler::Job;
use crate::middleware::metrics::{record_breach_check, record_new_breaches, record_notification};

/// Display name of the breach check job.
pub const BREACH_CHECK_JOB_NAME: &str = "Check for new breaches";

/// What happened to one owner during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerOutcome {
    /// The provider knows no breach for the address.
    NoBreaches,
    /// Every fetched breach was already stored.
    NothingNew,
    /// New breaches were stored; `notified` tells whether the alert went out.
    Stored { count: usize, notified: bool },
    LookupFailed(LookupErrorKind),
    /// Reading or writing breach records failed. Nothing was sent.
    StoreFailed,
}

impl OwnerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerOutcome::NoBreaches => "no_breaches",
            OwnerOutcome::NothingNew => "nothing_new",
            OwnerOutcome::Stored { .. } => "stored",
            OwnerOutcome::LookupFailed(kind) => kind.as_str(),
            OwnerOutcome::StoreFailed => "store_failed",
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreachCheckSummary {
    pub owners: usize,
    pub failed: usize,
    pub new_breaches: usize,
    pub notified: usize,
}

/// Runs the breach check over all monitored owners.
pub struct BreachCheckJob {
    owners: Arc<dyn OwnerStore>,
    breaches: Arc<dyn BreachStore>,
    source: Arc<dyn BreachSource>,
    notifier: Arc<dyn BreachNotifier>,
    pacing: Duration,
}

impl BreachCheckJob {
    pub fn new(
        owners: Arc<dyn OwnerStore>,
        breaches: Arc<dyn BreachStore>,
        source: Arc<dyn BreachSource>,
        notifier: Arc<dyn BreachNotifier>,
        pacing: Duration,
    ) -> Self {
        Self {
            owners,
            breaches,
            source,
            notifier,
            pacing,
        }
    }

    /// Checks every owner once. Never fails; problems are logged and counted.
    pub async fn run(&self) -> BreachCheckSummary {
        let mut summary = BreachCheckSummary::default();

        let owners = match self.owners.get_all_owners().await {
            Ok(owners) => owners,
            Err(e) => {
                error!(error = %e, "Failed to load monitored emails, skipping breach check");
                return summary;
            }
        };

        summary.owners = owners.len();
        info!(owners = owners.len(), "Starting breach check");

        for (index, owner) in owners.iter().enumerate() {
            let outcome = self.check_owner(owner).await;
            record_breach_check(outcome.as_str());

            match &outcome {
                OwnerOutcome::Stored { count, notified } => {
                    summary.new_breaches += count;
                    if *notified {
                        summary.notified += 1;
                    }
                }
                OwnerOutcome::LookupFailed(_) | OwnerOutcome::StoreFailed => summary.failed += 1,
                OwnerOutcome::NoBreaches | OwnerOutcome::NothingNew => {}
            }

            if index + 1 < owners.len() && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        info!(
            owners = summary.owners,
            failed = summary.failed,
            new_breaches = summary.new_breaches,
            notified = summary.notified,
            "Breach check finished"
        );
        summary
    }

    async fn check_owner(&self, owner: &MonitoredOwner) -> OwnerOutcome {
        let sites = match self.source.breached_account(&owner.email).await {
            Ok(Some(sites)) if !sites.is_empty() => sites,
            Ok(_) => return OwnerOutcome::NoBreaches,
            Err(e) => {
                warn!(
                    owner_id = owner.id,
                    email = %owner.email,
                    kind = e.kind().as_str(),
                    error = %e,
                    "Breach lookup failed, skipping owner"
                );
                return OwnerOutcome::LookupFailed(e.kind());
            }
        };

        let existing = match self.breaches.get_breaches_by_owner(owner.id).await {
            Ok(existing) => existing,
            Err(e) => {
                error!(owner_id = owner.id, error = %e, "Failed to load stored breaches");
                return OwnerOutcome::StoreFailed;
            }
        };

        let fetched: Vec<BreachRecord> = sites
            .into_iter()
            .map(|site| site.into_record(owner.id))
            .collect();
        let new = dedup(&existing, fetched);
        if new.is_empty() {
            return OwnerOutcome::NothingNew;
        }

        if let Err(e) = self.breaches.insert_breaches(&new).await {
            error!(
                owner_id = owner.id,
                new_breaches = new.len(),
                error = %e,
                "Failed to store new breaches, not notifying"
            );
            return OwnerOutcome::StoreFailed;
        }
        record_new_breaches(new.len());

        info!(
            owner_id = owner.id,
            email = %owner.email,
            new_breaches = new.len(),
            "New breaches stored"
        );

        let result = self.notifier.notify(&owner.email, &new).await;
        record_notification(result.as_str());
        if let NotificationResult::Failed(reason) = &result {
            warn!(owner_id = owner.id, reason = %reason, "Breach alert was not delivered");
        }

        OwnerOutcome::Stored {
            count: new.len(),
            notified: result.is_sent(),
        }
    }
}

#[async_trait::async_trait]
impl Job for BreachCheckJob {
    fn name(&self) -> &'static str {
        BREACH_CHECK_JOB_NAME
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self.run().await;
        if summary.owners > 0 && summary.failed == summary.owners {
            return Err(format!("all {} breach lookups failed", summary.owners));
        }
        Ok(())
    }
}
