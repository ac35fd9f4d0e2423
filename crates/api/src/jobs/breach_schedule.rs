//! Registration of the recurring breach check and runtime changes to its interval.

use std::sync::Arc;

use domain::models::{PwnCheckInterval, SchedulerSettingsResponse};
use domain::services::{PwnCheckSettings, SettingsError, StoreError};
use tracing::{error, info, warn};

use super::scheduler::{Job, JobFrequency, JobInfo, JobScheduler, SchedulerError};

/// Id the breach check is registered under.
pub const PWN_CHECK_JOB_ID: &str = "pwn_check_job";

/// Owns the `pwn_check_job` registration and keeps it in step with the
/// persisted interval settings.
pub struct BreachCheckScheduler {
    scheduler: Arc<JobScheduler>,
    settings: PwnCheckSettings,
    job: Arc<dyn Job>,
    // Serializes interval updates.
    update_lock: tokio::sync::Mutex<()>,
}

impl BreachCheckScheduler {
    pub fn new(scheduler: Arc<JobScheduler>, settings: PwnCheckSettings, job: Arc<dyn Job>) -> Self {
        Self {
            scheduler,
            settings,
            job,
            update_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Writes missing default settings and registers the job with the
    /// persisted interval.
    pub async fn init(&self) -> Result<PwnCheckInterval, SettingsError> {
        self.settings.ensure_defaults().await?;
        let interval = self.settings.interval().await?;

        self.register(JobFrequency::from(interval))
            .map_err(|e| SettingsError::UpdateFailed(e.to_string()))?;

        info!(interval = %interval, "Breach check scheduled");
        Ok(interval)
    }

    /// Moves the job to `interval`.
    ///
    /// The registration is removed, the interval persisted, then the job is
    /// registered again. If persisting fails the previous registration is put
    /// back. If re-registration fails the previous settings and registration
    /// are both restored.
    pub async fn update_interval(&self, interval: PwnCheckInterval) -> Result<(), SettingsError> {
        let _guard = self.update_lock.lock().await;

        let previous_interval = self.settings.interval().await?;
        let previous_frequency = self.scheduler.job_frequency(PWN_CHECK_JOB_ID);

        if !self.scheduler.remove_job(PWN_CHECK_JOB_ID) {
            info!("No existing breach check registration to remove");
        }

        if let Err(e) = self.settings.set_interval(interval).await {
            error!(error = %e, interval = %interval, "Failed to persist breach check interval");
            self.restore_registration(previous_frequency);
            return Err(e.into());
        }

        if let Err(e) = self.register(JobFrequency::from(interval)) {
            error!(error = %e, interval = %interval, "Failed to re-register breach check");
            if let Err(store_err) = self.settings.set_interval(previous_interval).await {
                warn!(
                    error = %store_err,
                    "Could not restore previous interval; settings and schedule differ until restart"
                );
            }
            self.restore_registration(previous_frequency);
            return Err(SettingsError::UpdateFailed(e.to_string()));
        }

        info!(
            previous = %previous_interval,
            interval = %interval,
            "Breach check interval updated"
        );
        Ok(())
    }

    /// Validates raw input and applies it. Invalid input is rejected before
    /// anything is written.
    pub async fn update_settings(
        &self,
        unit: &str,
        value: i64,
    ) -> Result<SchedulerSettingsResponse, SettingsError> {
        let interval = PwnCheckInterval::parse(unit, value)?;
        self.update_interval(interval).await?;
        Ok(interval.into())
    }

    pub async fn get_settings(&self) -> Result<SchedulerSettingsResponse, StoreError> {
        Ok(self.settings.interval().await?.into())
    }

    /// All registered jobs. Read only.
    pub fn get_status(&self) -> Vec<JobInfo> {
        self.scheduler.get_jobs()
    }

    fn register(&self, frequency: JobFrequency) -> Result<(), SchedulerError> {
        self.scheduler
            .add_job(PWN_CHECK_JOB_ID, Arc::clone(&self.job), frequency)
    }

    fn restore_registration(&self, previous: Option<JobFrequency>) {
        let Some(frequency) = previous else {
            return;
        };
        match self.register(frequency) {
            Ok(()) => info!(trigger = %frequency, "Restored previous breach check registration"),
            Err(e) => error!(error = %e, "Failed to restore previous breach check registration"),
        }
    }
}
