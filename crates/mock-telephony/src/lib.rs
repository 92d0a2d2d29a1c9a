//! Mock call placers for reminder scheduling tests.
//!
//! This crate provides implementations of the `CallPlacer` trait that never
//! touch the network:
//! - `RecordingPlacer` - Accepts every call and remembers it
//! - `FailingPlacer` - Rejects calls (all, or only for chosen numbers)
//! - `DelayedPlacer` - Wraps another placer with artificial latency
//!
//! # Example
//!
//! ```rust
//! use mock_telephony::{CallPlacer, OutboundCallRequest, RecordingPlacer, ReminderInfo};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_telephony::TelephonyError> {
//!     let placer = RecordingPlacer::new();
//!     let request = OutboundCallRequest::reminder(
//!         "+14155550123",
//!         ReminderInfo {
//!             what: "Take medicine".to_string(),
//!             time: "9:00 AM".to_string(),
//!             frequency: "daily".to_string(),
//!         },
//!     );
//!
//!     let receipt = placer.place_call(&request).await?;
//!     assert_eq!(receipt.call_sid.as_deref(), Some("CA-mock-1"));
//!     assert_eq!(placer.calls().len(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod recording;

// Re-export telephony types for convenience
pub use telephony::{
    async_trait, CallPlacer, CallReceipt, OutboundCallRequest, ReminderInfo, TelephonyError,
};

pub use delayed::DelayedPlacer;
pub use failing::FailingPlacer;
pub use recording::RecordingPlacer;
