//! Reminder poller and its lifecycle owner.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use database::{reminder, Database, DatabaseError, Reminder};
use recurrence::Zone;
use telephony::{CallPlacer, OutboundCallRequest, ReminderInfo, TelephonyError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Default time between polls (60 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default claim lease (5 minutes).
pub const DEFAULT_LEASE: Duration = Duration::from_secs(300);

/// Default bound on a single outbound call trigger (30 seconds).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default look-ahead for the upcoming reminders log (1 hour).
pub const DEFAULT_UPCOMING_WINDOW: Duration = Duration::from_secs(3600);

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between polls. The first poll happens one interval after start.
    pub poll_interval: Duration,

    /// How long a claimed reminder is reserved for this scheduler. Must
    /// comfortably exceed `call_timeout`.
    pub lease: Duration,

    /// Timeout for one outbound call trigger. A call that takes longer is
    /// treated as failed and retried on the next poll.
    pub call_timeout: Duration,

    /// Window for the upcoming reminders log.
    pub upcoming_window: Duration,

    /// Zone used to advance monthly reminders.
    pub zone: Zone,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            lease: DEFAULT_LEASE,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            upcoming_window: DEFAULT_UPCOMING_WINDOW,
            zone: Zone::Local,
        }
    }
}

impl SchedulerConfig {
    /// Create a config interpreting reminders in the given zone.
    pub fn with_zone(zone: Zone) -> Self {
        Self {
            zone,
            ..Default::default()
        }
    }
}

/// Errors that can occur while scheduling.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Error from the reminder store.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Error from the telephony bridge.
    #[error("telephony error: {0}")]
    Telephony(#[from] TelephonyError),

    /// The call trigger did not finish in time.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// `start` was called on a running scheduler.
    #[error("scheduler already running")]
    AlreadyRunning,

    /// `stop` was called on a scheduler that is not running.
    #[error("scheduler not running")]
    NotRunning,

    /// The polling task panicked or was aborted.
    #[error("scheduler task failed: {0}")]
    TaskFailed(String),
}

/// Result of firing a single due reminder.
#[derive(Debug)]
pub enum FireResult {
    /// The call was placed and the reminder advanced.
    Fired {
        id: String,
        next_call_time: i64,
        active: bool,
        call_sid: Option<String>,
    },
    /// Another scheduler holds the reminder.
    Skipped { id: String, reason: String },
    /// The call failed; the reminder stays due.
    Failed { id: String, error: SchedulerError },
}

/// Counts from one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub fired: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Finds due reminders and places their calls.
///
/// Cheap to clone; clones share the database pool and call placer.
#[derive(Clone)]
pub struct ReminderPoller {
    db: Database,
    placer: Arc<dyn CallPlacer>,
    config: SchedulerConfig,
}

impl ReminderPoller {
    /// Create a new poller.
    pub fn new(db: Database, placer: Arc<dyn CallPlacer>, config: SchedulerConfig) -> Self {
        Self { db, placer, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one poll at `now`.
    ///
    /// Due reminders are fired one after another. A store error aborts the
    /// poll; call failures are counted and leave the reminder due.
    ///
    /// `now` selects the due reminders. Each claim is stamped with `now`
    /// plus the time the poll has been running, so later leases in a slow
    /// poll still extend `lease` past their own claim.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, SchedulerError> {
        let started = Instant::now();
        let due = reminder::list_due(self.db.pool(), now).await?;
        self.log_upcoming(now).await?;

        let mut report = TickReport {
            due: due.len(),
            ..Default::default()
        };

        if due.is_empty() {
            debug!("No reminders due");
            return Ok(report);
        }

        info!(count = due.len(), "Processing due reminders");

        for (index, due_reminder) in due.iter().enumerate() {
            debug!(
                id = %due_reminder.id,
                position = index + 1,
                of = due.len(),
                "Processing reminder"
            );

            match self.fire(due_reminder, since(now, started)).await? {
                FireResult::Fired { .. } => report.fired += 1,
                FireResult::Skipped { .. } => report.skipped += 1,
                FireResult::Failed { .. } => report.failed += 1,
            }
        }

        info!(
            due = report.due,
            fired = report.fired,
            failed = report.failed,
            skipped = report.skipped,
            "Finished processing due reminders"
        );

        Ok(report)
    }

    /// Claim, call and advance one due reminder.
    ///
    /// The claim is taken at `now`; the firing is recorded at `now` plus the
    /// time the call took. Returns `Err` only for store errors. Call failures
    /// release the claim and come back as [`FireResult::Failed`].
    pub async fn fire(
        &self,
        due: &Reminder,
        now: DateTime<Utc>,
    ) -> Result<FireResult, SchedulerError> {
        let pool = self.db.pool();
        let claimed_at = Instant::now();

        if !reminder::claim_reminder(pool, &due.id, now, self.config.lease).await? {
            debug!(id = %due.id, "Reminder held by another scheduler, skipping");
            return Ok(FireResult::Skipped {
                id: due.id.clone(),
                reason: "claimed by another scheduler".to_string(),
            });
        }

        let request = call_request(due);
        info!(
            id = %due.id,
            phone = %due.phone_number,
            what = %due.what,
            frequency = %due.frequency,
            placer = self.placer.name(),
            "Placing reminder call"
        );

        let outcome = timeout(self.config.call_timeout, self.placer.place_call(&request)).await;

        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                warn!(id = %due.id, "Reminder call failed: {}", e);
                self.release(&due.id).await;
                return Ok(FireResult::Failed {
                    id: due.id.clone(),
                    error: SchedulerError::Telephony(e),
                });
            }
            Err(_elapsed) => {
                warn!(
                    id = %due.id,
                    "Reminder call timed out after {:?}",
                    self.config.call_timeout
                );
                self.release(&due.id).await;
                return Ok(FireResult::Failed {
                    id: due.id.clone(),
                    error: SchedulerError::Timeout(self.config.call_timeout),
                });
            }
        };

        let advanced = reminder::advance_reminder(
            pool,
            &due.id,
            &self.config.zone,
            since(now, claimed_at),
            receipt.reference(),
        )
        .await?;

        Ok(FireResult::Fired {
            id: advanced.id,
            next_call_time: advanced.next_call_time,
            active: advanced.active,
            call_sid: receipt.call_sid,
        })
    }

    /// Poll on the configured interval until `shutdown_signal` completes.
    ///
    /// A poll in progress finishes before the loop exits.
    pub async fn run_with_shutdown<S>(self, shutdown_signal: S)
    where
        S: Future<Output = ()> + Send,
    {
        let period = self.config.poll_interval;
        info!(
            placer = self.placer.name(),
            poll_interval = ?period,
            "Starting reminder scheduler"
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping reminder scheduler");
                    return;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.tick(Utc::now()).await {
                        // Next tick starts from scratch
                        error!("Reminder poll failed: {}", e);
                    }
                }
            }
        }
    }

    async fn release(&self, id: &str) {
        if let Err(e) = reminder::release_claim(self.db.pool(), id).await {
            warn!(id = %id, "Failed to release claim, it will lapse: {}", e);
        }
    }

    async fn log_upcoming(&self, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        let upcoming =
            reminder::list_upcoming(self.db.pool(), now, self.config.upcoming_window).await?;

        if upcoming.is_empty() {
            return Ok(());
        }

        info!(
            count = upcoming.len(),
            window = ?self.config.upcoming_window,
            "Upcoming reminders"
        );
        let now_ms = now.timestamp_millis();
        for r in &upcoming {
            debug!(
                id = %r.id,
                phone = %r.phone_number,
                what = %r.what,
                in_minutes = (r.next_call_time - now_ms) / 60_000,
                "Upcoming reminder"
            );
        }
        Ok(())
    }
}

/// `at` moved forward by the monotonic time elapsed since `started`.
fn since(at: DateTime<Utc>, started: Instant) -> DateTime<Utc> {
    chrono::Duration::from_std(started.elapsed())
        .ok()
        .and_then(|elapsed| at.checked_add_signed(elapsed))
        .unwrap_or(at)
}

/// Build the outbound request for a reminder occurrence.
///
/// The idempotency key names the occurrence (`<id>:<nextCallTime>`), so
/// retries of one occurrence share a key and the next occurrence gets a new one.
pub fn call_request(r: &Reminder) -> OutboundCallRequest {
    OutboundCallRequest::reminder(
        r.phone_number.clone(),
        ReminderInfo {
            what: r.what.clone(),
            time: r.time.clone(),
            frequency: r.frequency.to_string(),
        },
    )
    .with_idempotency_key(format!("{}:{}", r.id, r.next_call_time))
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns a [`ReminderPoller`] running as a background task.
///
/// Construct once in the hosting process, then `start()` and `stop()`.
/// Dropping a running scheduler also stops its task.
pub struct ReminderScheduler {
    poller: ReminderPoller,
    running: Option<Running>,
}

impl ReminderScheduler {
    /// Create a stopped scheduler.
    pub fn new(db: Database, placer: Arc<dyn CallPlacer>, config: SchedulerConfig) -> Self {
        Self {
            poller: ReminderPoller::new(db, placer, config),
            running: None,
        }
    }

    /// Get the poller, e.g. to run a single tick.
    pub fn poller(&self) -> &ReminderPoller {
        &self.poller
    }

    /// Whether the background task is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Spawn the polling task. Must be called within a Tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            warn!("Scheduler already running, skipping start");
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown, mut stop_rx) = watch::channel(false);
        let poller = self.poller.clone();
        let task = tokio::spawn(async move {
            let signal = async move {
                // A dropped sender also stops the loop
                let _ = stop_rx.wait_for(|stop| *stop).await;
            };
            poller.run_with_shutdown(signal).await;
        });

        self.running = Some(Running { shutdown, task });
        Ok(())
    }

    /// Signal the polling task and wait for it to exit.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let Some(running) = self.running.take() else {
            return Err(SchedulerError::NotRunning);
        };

        let _ = running.shutdown.send(true);
        running
            .task
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        info!("Reminder scheduler stopped");
        Ok(())
    }
}
