//! Configuration types for the telephony bridge client.

use std::time::Duration;

use crate::error::TelephonyError;

/// Default request timeout for outbound call triggers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for reaching the telephony bridge.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    /// Base URL of the bridge (e.g., "http://localhost:3000").
    pub base_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

impl TelephonyConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the outbound call endpoint URL.
    pub fn outbound_url(&self) -> String {
        format!("{}/api/telephony/outbound", self.base_url.trim_end_matches('/'))
    }

    /// Check that the base URL is usable.
    pub fn validate(&self) -> Result<(), TelephonyError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TelephonyError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(TelephonyError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:3000")
    }
}
