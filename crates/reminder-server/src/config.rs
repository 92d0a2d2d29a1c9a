//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use recurrence::{Zone, ZoneError};

/// Reminder server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Telephony bridge base URL.
    pub telephony_base_url: String,
    /// Request timeout for the telephony bridge.
    pub telephony_timeout: Duration,
    /// Time between scheduler polls.
    pub poll_interval: Duration,
    /// Claim lease held while a reminder call is in flight.
    pub lease: Duration,
    /// Zone time phrases are read in.
    pub zone: Zone,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `REMINDER_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:reminders.db?mode=rwc` |
    /// | `TELEPHONY_BASE_URL` | Telephony bridge URL | `http://127.0.0.1:3000` |
    /// | `TELEPHONY_TIMEOUT_SECS` | Bridge request timeout | `30` |
    /// | `REMINDER_POLL_SECS` | Scheduler poll interval | `60` |
    /// | `REMINDER_LEASE_SECS` | Claim lease | `300` |
    /// | `REMINDER_UTC_OFFSET` | Fixed offset such as `+05:30` | local zone |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("REMINDER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:reminders.db?mode=rwc".to_string());

        let telephony_base_url = env::var("TELEPHONY_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

        let telephony_timeout = secs_var("TELEPHONY_TIMEOUT_SECS", 30)?;
        let poll_interval = secs_var("REMINDER_POLL_SECS", 60)?;
        let lease = secs_var("REMINDER_LEASE_SECS", 300)?;

        let zone = match env::var("REMINDER_UTC_OFFSET") {
            Ok(offset) if !offset.trim().is_empty() => offset.parse()?,
            _ => Zone::Local,
        };

        if lease <= telephony_timeout {
            return Err(ConfigError::LeaseTooShort);
        }

        Ok(Self {
            addr,
            database_url,
            telephony_base_url,
            telephony_timeout,
            poll_interval,
            lease,
            zone,
        })
    }
}

fn secs_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let secs = match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber(name))?,
        Err(_) => default,
    };

    if secs == 0 {
        return Err(ConfigError::InvalidNumber(name));
    }
    Ok(Duration::from_secs(secs))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid REMINDER_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a positive number of seconds")]
    InvalidNumber(&'static str),

    #[error("Invalid REMINDER_UTC_OFFSET: {0}")]
    InvalidOffset(#[from] ZoneError),

    #[error("REMINDER_LEASE_SECS must exceed TELEPHONY_TIMEOUT_SECS")]
    LeaseTooShort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_var() {
        assert_eq!(
            secs_var("REMINDER_TEST_UNSET_SECS", 60).unwrap(),
            Duration::from_secs(60)
        );

        env::set_var("REMINDER_TEST_GOOD_SECS", " 15 ");
        assert_eq!(
            secs_var("REMINDER_TEST_GOOD_SECS", 60).unwrap(),
            Duration::from_secs(15)
        );

        env::set_var("REMINDER_TEST_ZERO_SECS", "0");
        assert!(matches!(
            secs_var("REMINDER_TEST_ZERO_SECS", 60),
            Err(ConfigError::InvalidNumber("REMINDER_TEST_ZERO_SECS"))
        ));

        env::set_var("REMINDER_TEST_BAD_SECS", "soon");
        assert!(secs_var("REMINDER_TEST_BAD_SECS", 60).is_err());
    }
}
