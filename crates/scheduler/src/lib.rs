//! Polling scheduler for reminder calls.
//!
//! Once per poll interval the scheduler lists reminders whose
//! `next_call_time` has passed, claims each one, asks a [`CallPlacer`] to
//! phone the user and then advances the reminder to its next occurrence.
//! A failed call leaves the reminder due, so it is retried on the next poll.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use database::Database;
//! use scheduler::{ReminderScheduler, SchedulerConfig};
//! use telephony::{TelephonyClient, TelephonyConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite:reminders.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let client = TelephonyClient::new(TelephonyConfig::default())?;
//! let mut scheduler = ReminderScheduler::new(db, Arc::new(client), SchedulerConfig::default());
//! scheduler.start()?;
//!
//! // ... serve requests ...
//!
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`CallPlacer`]: telephony::CallPlacer

pub mod scheduler;

pub use scheduler::{
    call_request, FireResult, ReminderPoller, ReminderScheduler, SchedulerConfig, SchedulerError,
    TickReport, DEFAULT_CALL_TIMEOUT, DEFAULT_LEASE, DEFAULT_POLL_INTERVAL,
    DEFAULT_UPCOMING_WINDOW,
};
