//! Delayed placer - wraps another placer with artificial delay.

use std::time::Duration;

use telephony::{async_trait, CallPlacer, CallReceipt, OutboundCallRequest, TelephonyError};
use tokio::time::sleep;

/// A placer that wraps another placer and adds artificial delay.
///
/// Useful for testing call timeouts and a slow bridge stalling a tick.
pub struct DelayedPlacer<P: CallPlacer> {
    inner: P,
    delay: Duration,
}

impl<P: CallPlacer> DelayedPlacer<P> {
    /// Create a new DelayedPlacer wrapping the given placer with the specified delay.
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a placer with a delay in milliseconds.
    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// The wrapped placer.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: CallPlacer> CallPlacer for DelayedPlacer<P> {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<CallReceipt, TelephonyError> {
        sleep(self.delay).await;
        self.inner.place_call(request).await
    }

    fn name(&self) -> &str {
        "DelayedPlacer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingPlacer;
    use std::time::Instant;
    use telephony::ReminderInfo;

    #[tokio::test]
    async fn test_delayed_placer() {
        let placer = DelayedPlacer::with_millis(RecordingPlacer::new(), 100);
        let request = OutboundCallRequest::reminder(
            "+14155550123",
            ReminderInfo {
                what: "Take medicine".to_string(),
                time: "9:00 AM".to_string(),
                frequency: "daily".to_string(),
            },
        );

        let start = Instant::now();
        let receipt = placer.place_call(&request).await.unwrap();
        let elapsed = start.elapsed();

        assert!(receipt.call_sid.is_some());
        assert!(elapsed >= Duration::from_millis(100));
        assert_eq!(placer.inner().call_count(), 1);
    }

    #[test]
    fn test_placer_name() {
        let placer = DelayedPlacer::with_millis(RecordingPlacer::new(), 0);
        assert_eq!(placer.name(), "DelayedPlacer");
    }
}
