//! Time phrase resolution and recurrence arithmetic for reminder calls.
//!
//! Reminders are created with loose, human time phrases ("9 AM",
//! "after dinner") and a frequency tag. This crate turns those into concrete
//! epoch-millisecond firing times and computes how a reminder moves forward
//! after each firing.
//!
//! # Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use recurrence::{resolve_next_call, Frequency};
//!
//! let tz = FixedOffset::east_opt(0).unwrap();
//! let now = tz.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
//!
//! // 9 AM has already passed, so a daily reminder starts tomorrow.
//! let res = resolve_next_call("9:00 AM", &Frequency::Daily, &now);
//! let expected = tz.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap();
//! assert_eq!(res.next_call_time, expected.timestamp_millis());
//! ```

pub mod frequency;
pub mod resolver;
pub mod time_of_day;

pub use frequency::{Frequency, ReminderKind};
pub use resolver::{
    advance_after_firing, resolve_next_call, Advance, Resolution, Zone, ZoneError, DAY_MS,
    HALF_DAY_MS, UNSCHEDULED, WEEK_MS,
};
pub use time_of_day::{TimeOfDay, TimeSource, DEFAULT_HOUR};
