//! Parsing of loose human time phrases into a wall-clock time of day.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `9 AM`, `9:30pm`, `7:56 P.M.`
static MERIDIEM_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\b").unwrap()
});

/// `14:30`, `9`
static BARE_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\b").unwrap());

/// Daypart vocabulary, checked in order.
const DAYPARTS: &[(&str, u32)] = &[
    ("after dinner", 19),
    ("morning", 9),
    ("evening", 18),
    ("night", 21),
];

/// Hour used when nothing in the phrase is recognized.
pub const DEFAULT_HOUR: u32 = 9;

/// Which rule produced a [`TimeOfDay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
    /// An explicit clock time, with or without AM/PM.
    Clock,
    /// A daypart word such as "evening".
    Daypart,
    /// Nothing matched; the 9:00 fallback was used.
    Default,
}

/// A wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub source: TimeSource,
}

impl TimeOfDay {
    fn clock(hour: u32, minute: u32) -> Self {
        Self {
            hour,
            minute,
            source: TimeSource::Clock,
        }
    }

    fn fallback() -> Self {
        Self {
            hour: DEFAULT_HOUR,
            minute: 0,
            source: TimeSource::Default,
        }
    }

    /// Parse a time phrase. Never fails: unrecognized or out-of-range input
    /// resolves to 9:00 with [`TimeSource::Default`].
    pub fn parse(phrase: &str) -> Self {
        // A meridiem marker commits the phrase to the 12-hour reading.
        let parsed = match MERIDIEM_CLOCK.captures(phrase) {
            Some(caps) => Self::from_meridiem(&caps),
            None => Self::parse_daypart(phrase).or_else(|| Self::parse_bare(phrase)),
        };

        match parsed {
            Some(time) => time,
            None => {
                warn!(phrase = %phrase, "Unrecognized time phrase, defaulting to 9:00");
                Self::fallback()
            }
        }
    }

    /// Whether the phrase fell back to the default time.
    pub fn is_default(&self) -> bool {
        self.source == TimeSource::Default
    }

    fn from_meridiem(caps: &regex::Captures<'_>) -> Option<Self> {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
        Some(Self::clock(hour, minute))
    }

    fn parse_daypart(phrase: &str) -> Option<Self> {
        let lower = phrase.to_lowercase();
        DAYPARTS
            .iter()
            .find(|(word, _)| lower.contains(word))
            .map(|&(_, hour)| Self {
                hour,
                minute: 0,
                source: TimeSource::Daypart,
            })
    }

    fn parse_bare(phrase: &str) -> Option<Self> {
        let caps = BARE_CLOCK.captures(phrase)?;
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self::clock(hour, minute))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(phrase: &str) -> (u32, u32) {
        let t = TimeOfDay::parse(phrase);
        (t.hour, t.minute)
    }

    #[test]
    fn test_meridiem_conversion() {
        assert_eq!(hm("9:00 AM"), (9, 0));
        assert_eq!(hm("7:56 PM"), (19, 56));
        assert_eq!(hm("12:00 AM"), (0, 0));
        assert_eq!(hm("12:15 PM"), (12, 15));
        assert_eq!(hm("6 am"), (6, 0));
        assert_eq!(hm("8:30pm"), (20, 30));
        assert_eq!(hm("10 p.m."), (22, 0));
    }

    #[test]
    fn test_meridiem_for_every_clock_value() {
        for hour in 1..=12u32 {
            for minute in [0u32, 7, 30, 59] {
                let am = TimeOfDay::parse(&format!("{}:{:02} AM", hour, minute));
                let pm = TimeOfDay::parse(&format!("{}:{:02} PM", hour, minute));
                assert_eq!(am.hour, hour % 12);
                assert_eq!(pm.hour, hour % 12 + 12);
                assert_eq!(am.minute, minute);
                assert_eq!(pm.minute, minute);
                assert_eq!(am.source, TimeSource::Clock);
            }
        }
    }

    #[test]
    fn test_dayparts() {
        assert_eq!(hm("after dinner"), (19, 0));
        assert_eq!(hm("in the Morning"), (9, 0));
        assert_eq!(hm("evening"), (18, 0));
        assert_eq!(hm("before bed at night"), (21, 0));
        assert_eq!(TimeOfDay::parse("evening").source, TimeSource::Daypart);
    }

    #[test]
    fn test_clock_takes_precedence_over_daypart() {
        assert_eq!(hm("after dinner around 8 PM"), (20, 0));
    }

    #[test]
    fn test_bare_24_hour() {
        assert_eq!(hm("14:30"), (14, 30));
        assert_eq!(hm("at 7"), (7, 0));
        assert_eq!(hm("0:05"), (0, 5));
    }

    #[test]
    fn test_fallback_to_nine() {
        for phrase in ["whenever", "", "25:00", "13 PM", "9:75 AM"] {
            let t = TimeOfDay::parse(phrase);
            assert_eq!((t.hour, t.minute), (9, 0), "phrase {:?}", phrase);
            assert!(t.is_default(), "phrase {:?}", phrase);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeOfDay::parse("7:05 PM").to_string(), "19:05");
    }
}
