//! Job scheduler infrastructure for background tasks.
//!
//! Each registered job runs on its own tokio task driven by an interval.
//! Registrations can be removed and re-added at runtime; removing one stops
//! future runs but lets a run already in progress finish. Runs of the same
//! job id never overlap, even across re-registrations.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use domain::models::{IntervalUnit, PwnCheckInterval};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::middleware::metrics::record_job_run;

/// Job frequency for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

impl JobFrequency {
    /// Get the duration between job executions.
    pub fn duration(&self) -> Duration {
        match *self {
            JobFrequency::Seconds(n) => Duration::from_secs(n),
            JobFrequency::Minutes(n) => Duration::from_secs(n.saturating_mul(60)),
            JobFrequency::Hours(n) => Duration::from_secs(n.saturating_mul(3_600)),
            JobFrequency::Days(n) => Duration::from_secs(n.saturating_mul(86_400)),
        }
    }
}

impl From<PwnCheckInterval> for JobFrequency {
    fn from(interval: PwnCheckInterval) -> Self {
        match interval.unit {
            IntervalUnit::Seconds => JobFrequency::Seconds(interval.value),
            IntervalUnit::Minutes => JobFrequency::Minutes(interval.value),
            IntervalUnit::Hours => JobFrequency::Hours(interval.value),
            IntervalUnit::Days => JobFrequency::Days(interval.value),
        }
    }
}

impl fmt::Display for JobFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, unit) = match *self {
            JobFrequency::Seconds(n) => (n, "seconds"),
            JobFrequency::Minutes(n) => (n, "minutes"),
            JobFrequency::Hours(n) => (n, "hours"),
            JobFrequency::Days(n) => (n, "days"),
        };
        write!(f, "interval[{} {}]", n, unit)
    }
}

/// Trait for implementing background jobs.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// The name of this job (used for logging and status).
    fn name(&self) -> &'static str;

    /// Execute the job. Returns Ok(()) on success, Err with message on failure.
    async fn execute(&self) -> Result<(), String>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Job '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Job frequency must be greater than zero")]
    ZeroFrequency,

    #[error("Scheduler is shut down")]
    ShutDown,
}

/// Read-only view of a registered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JobInfo {
    pub id: String,
    pub name: String,
    pub next_run_time: Option<DateTime<Utc>>,
    pub trigger: String,
}

struct Registration {
    name: &'static str,
    frequency: JobFrequency,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Background job scheduler.
pub struct JobScheduler {
    registrations: Mutex<HashMap<String, Registration>>,
    // One lock per job id, shared by every registration of that id.
    run_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    // Tasks of removed registrations that may still be finishing a run.
    retired: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn next_run_after(period: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(period)
        .ok()
        .and_then(|d| Utc::now().checked_add_signed(d))
}

impl JobScheduler {
    /// Create a new job scheduler.
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            registrations: Mutex::new(HashMap::new()),
            run_locks: Mutex::new(HashMap::new()),
            retired: Mutex::new(Vec::new()),
            shutdown_tx,
        }
    }

    /// Register `job` under `id` and start running it every `frequency`.
    ///
    /// The first run happens one full period after registration.
    pub fn add_job(
        &self,
        id: &str,
        job: Arc<dyn Job>,
        frequency: JobFrequency,
    ) -> Result<(), SchedulerError> {
        if *self.shutdown_tx.borrow() {
            return Err(SchedulerError::ShutDown);
        }
        let period = frequency.duration();
        if period.is_zero() {
            return Err(SchedulerError::ZeroFrequency);
        }

        let mut registrations = lock(&self.registrations);
        if registrations.contains_key(id) {
            return Err(SchedulerError::AlreadyRegistered(id.to_string()));
        }

        let run_lock = lock(&self.run_locks)
            .entry(id.to_string())
            .or_default()
            .clone();
        let next_run = Arc::new(Mutex::new(next_run_after(period)));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let name = job.name();
        let handle = tokio::spawn(run_job(
            id.to_string(),
            job,
            period,
            run_lock,
            Arc::clone(&next_run),
            cancel_rx,
            self.shutdown_tx.subscribe(),
        ));

        info!(job_id = %id, job = name, trigger = %frequency, "Job scheduled");
        registrations.insert(
            id.to_string(),
            Registration {
                name,
                frequency,
                next_run,
                cancel_tx,
                handle,
            },
        );
        Ok(())
    }

    /// Remove the registration for `id`. Returns false if there was none.
    ///
    /// A run already in progress is allowed to finish.
    pub fn remove_job(&self, id: &str) -> bool {
        let Some(registration) = lock(&self.registrations).remove(id) else {
            return false;
        };

        let _ = registration.cancel_tx.send(true);
        let mut retired = lock(&self.retired);
        retired.retain(|handle| !handle.is_finished());
        retired.push(registration.handle);

        info!(job_id = %id, job = registration.name, "Job removed");
        true
    }

    /// Current frequency of the job registered under `id`.
    pub fn job_frequency(&self, id: &str) -> Option<JobFrequency> {
        lock(&self.registrations).get(id).map(|r| r.frequency)
    }

    /// Snapshot of all registered jobs, ordered by id.
    pub fn get_jobs(&self) -> Vec<JobInfo> {
        let registrations = lock(&self.registrations);
        let mut jobs: Vec<JobInfo> = registrations
            .iter()
            .map(|(id, r)| JobInfo {
                id: id.clone(),
                name: r.name.to_string(),
                next_run_time: *lock(&r.next_run),
                trigger: r.frequency.to_string(),
            })
            .collect();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        jobs
    }

    /// Initiate graceful shutdown of all jobs.
    /// Returns immediately after signaling shutdown.
    pub fn shutdown(&self) {
        info!("Initiating job scheduler shutdown");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for all job tasks to complete, including runs in progress, with timeout.
    pub async fn wait_for_shutdown(&self, timeout: Duration) {
        info!("Waiting for jobs to complete (timeout: {:?})", timeout);

        let mut handles: Vec<JoinHandle<()>> = lock(&self.registrations)
            .drain()
            .map(|(_, r)| r.handle)
            .collect();
        handles.append(&mut lock(&self.retired));

        let shutdown_future = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!("Job task panicked: {}", e);
                }
            }
        };

        match tokio::time::timeout(timeout, shutdown_future).await {
            Ok(()) => info!("All jobs completed gracefully"),
            Err(_) => warn!("Job shutdown timed out after {:?}", timeout),
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(
    id: String,
    job: Arc<dyn Job>,
    period: Duration,
    run_lock: Arc<tokio::sync::Mutex<()>>,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
    mut cancel_rx: watch::Receiver<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let name = job.name();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Skip the first immediate tick
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                *lock(&next_run) = next_run_after(period);

                let Ok(_guard) = run_lock.try_lock() else {
                    warn!(job_id = %id, job = name, "Previous run still in progress, skipping");
                    continue;
                };

                let start = Instant::now();
                info!(job_id = %id, job = name, "Job starting");

                // Own task so a panicking run does not take the registration down.
                let run = tokio::spawn({
                    let job = Arc::clone(&job);
                    async move { job.execute().await }
                });
                let result = match run.await {
                    Ok(result) => result,
                    Err(e) => Err(format!("run aborted: {}", e)),
                };
                let elapsed = start.elapsed();
                record_job_run(name, result.is_ok(), elapsed.as_secs_f64());

                match result {
                    Ok(()) => info!(
                        job_id = %id,
                        job = name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Job completed successfully"
                    ),
                    Err(e) => error!(
                        job_id = %id,
                        job = name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "Job failed"
                    ),
                }
            }
            _ = cancel_rx.changed() => {
                info!(job_id = %id, job = name, "Job registration cancelled");
                break;
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!(job_id = %id, job = name, "Job shutting down");
                    break;
                }
            }
        }
    }
}
