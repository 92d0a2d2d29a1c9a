//! Telephony bridge client library.
//!
//! This crate triggers outbound reminder calls through an HTTP bridge that
//! fronts the carrier and voice agent. It provides:
//!
//! - The wire types for `POST /api/telephony/outbound`
//! - [`TelephonyClient`], a `reqwest`-based client for that endpoint
//! - The [`CallPlacer`] trait the scheduler is written against
//!
//! # Example
//!
//! ```no_run
//! use telephony::{OutboundCallRequest, ReminderInfo, TelephonyClient, TelephonyConfig};
//!
//! # async fn example() -> Result<(), telephony::TelephonyError> {
//! let client = TelephonyClient::new(TelephonyConfig::new("http://localhost:3000"))?;
//!
//! let request = OutboundCallRequest::reminder(
//!     "+14155550123",
//!     ReminderInfo {
//!         what: "Take medicine".to_string(),
//!         time: "9:00 AM".to_string(),
//!         frequency: "daily".to_string(),
//!     },
//! )
//! .with_idempotency_key("reminder_abc:1741597200000");
//!
//! let receipt = client.place_outbound_call(&request).await?;
//! println!("Call SID: {:?}", receipt.call_sid);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod placer;
pub mod types;

pub use async_trait::async_trait;
pub use client::{TelephonyClient, IDEMPOTENCY_HEADER};
pub use config::{TelephonyConfig, DEFAULT_TIMEOUT};
pub use error::TelephonyError;
pub use placer::CallPlacer;
pub use types::{CallReceipt, OutboundCallRequest, OutboundCallResponse, ReminderInfo};
