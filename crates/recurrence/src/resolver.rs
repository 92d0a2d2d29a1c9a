//! Next-fire computation for reminders.
//!
//! All arithmetic happens on wall-clock time in a single zone: either the
//! process's local zone or a configured fixed UTC offset. Timestamps are epoch
//! milliseconds, with [`UNSCHEDULED`] (`0`) meaning "do not fire".

use std::str::FromStr;

use chrono::{
    DateTime, Days, Duration, FixedOffset, Local, LocalResult, Months, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use thiserror::Error;

use crate::frequency::Frequency;
use crate::time_of_day::TimeOfDay;

/// Sentinel timestamp for a reminder that should never fire.
pub const UNSCHEDULED: i64 = 0;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const HALF_DAY_MS: i64 = DAY_MS / 2;
pub const WEEK_MS: i64 = 7 * DAY_MS;

/// Outcome of resolving a time phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Epoch milliseconds of the first firing, or [`UNSCHEDULED`].
    pub next_call_time: i64,
    /// The time of day the phrase was read as.
    pub time: TimeOfDay,
}

impl Resolution {
    pub fn is_scheduled(&self) -> bool {
        self.next_call_time > UNSCHEDULED
    }
}

/// State of a reminder after one firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub next_call_time: i64,
    pub active: bool,
}

/// Resolve a time phrase into the next firing at or after `now`.
///
/// Today's occurrence is used when it is still in the future. Otherwise the
/// occurrence moves forward one period for recurring frequencies, and is
/// [`UNSCHEDULED`] for one-off reminders.
pub fn resolve_next_call<Tz: TimeZone>(
    phrase: &str,
    frequency: &Frequency,
    now: &DateTime<Tz>,
) -> Resolution {
    let time = TimeOfDay::parse(phrase);
    let tz = now.timezone();
    let wall = NaiveTime::from_hms_opt(time.hour, time.minute, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(wall);

    let target = localize(&tz, today);
    if target.timestamp_millis() > now.timestamp_millis() {
        return Resolution {
            next_call_time: target.timestamp_millis(),
            time,
        };
    }

    let next = match frequency {
        Frequency::Daily | Frequency::TwiceADay => today.checked_add_days(Days::new(1)),
        Frequency::Weekly => today.checked_add_days(Days::new(7)),
        Frequency::Monthly => today.checked_add_months(Months::new(1)),
        Frequency::Once | Frequency::Other(_) => None,
    };

    Resolution {
        next_call_time: next
            .map(|n| localize(&tz, n).timestamp_millis())
            .unwrap_or(UNSCHEDULED),
        time,
    }
}

/// Compute the state of a reminder after it fired at its scheduled `previous` time.
pub fn advance_after_firing<Tz: TimeZone>(
    frequency: &Frequency,
    previous: i64,
    tz: &Tz,
) -> Advance {
    let next_call_time = match frequency {
        Frequency::Once | Frequency::Other(_) => {
            return Advance {
                next_call_time: previous,
                active: false,
            }
        }
        Frequency::Daily => previous + DAY_MS,
        Frequency::TwiceADay => previous + HALF_DAY_MS,
        Frequency::Weekly => previous + WEEK_MS,
        Frequency::Monthly => tz
            .timestamp_millis_opt(previous)
            .single()
            .and_then(|dt| dt.naive_local().checked_add_months(Months::new(1)))
            .map(|n| localize(tz, n).timestamp_millis())
            .unwrap_or(previous + 30 * DAY_MS),
    };

    Advance {
        next_call_time,
        active: true,
    }
}

/// Map a wall-clock time onto the zone. Ambiguous times take the earlier
/// instant; times skipped by a DST jump move forward an hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Errors parsing a [`Zone`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("invalid UTC offset: {0}")]
    InvalidOffset(String),
}

/// The zone reminder phrases are interpreted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    /// The process's local time zone.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl Zone {
    /// Resolve a time phrase in this zone. See [`resolve_next_call`].
    pub fn resolve(&self, phrase: &str, frequency: &Frequency, now: DateTime<Utc>) -> Resolution {
        match self {
            Zone::Local => resolve_next_call(phrase, frequency, &now.with_timezone(&Local)),
            Zone::Fixed(offset) => resolve_next_call(phrase, frequency, &now.with_timezone(offset)),
        }
    }

    /// Advance a fired reminder in this zone. See [`advance_after_firing`].
    pub fn advance(&self, frequency: &Frequency, previous: i64) -> Advance {
        match self {
            Zone::Local => advance_after_firing(frequency, previous, &Local),
            Zone::Fixed(offset) => advance_after_firing(frequency, previous, offset),
        }
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    /// Accepts `local`, `UTC`, `Z`, `+05:30`, `-0800` and `+7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return FixedOffset::east_opt(0)
                .map(Zone::Fixed)
                .ok_or_else(|| ZoneError::InvalidOffset(s.to_string()));
        }

        let invalid = || ZoneError::InvalidOffset(s.to_string());
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 => match (rest.get(..2), rest.get(2..)) {
                (Some(h), Some(m)) => (h, m),
                _ => return Err(invalid()),
            },
            None => (rest, "0"),
        };
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 14 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(invalid)
    }
}
