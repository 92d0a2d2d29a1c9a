//! Failing placer - simulates a bridge that rejects calls.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use telephony::{async_trait, CallPlacer, CallReceipt, OutboundCallRequest, TelephonyError};

/// A placer that rejects calls.
///
/// By default every call fails. With [`FailingPlacer::for_numbers`] only the
/// listed phone numbers fail and the rest succeed.
#[derive(Debug, Clone, Default)]
pub struct FailingPlacer {
    only: Option<HashSet<String>>,
    attempts: Arc<AtomicUsize>,
}

impl FailingPlacer {
    /// A placer that fails every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// A placer that fails only calls to the given numbers.
    pub fn for_numbers<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(numbers.into_iter().map(Into::into).collect()),
            attempts: Arc::default(),
        }
    }

    /// Number of calls attempted, failed or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn should_fail(&self, phone: &str) -> bool {
        match &self.only {
            Some(numbers) => numbers.contains(phone),
            None => true,
        }
    }
}

#[async_trait]
impl CallPlacer for FailingPlacer {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<CallReceipt, TelephonyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.should_fail(&request.phone_number) {
            return Err(TelephonyError::Status {
                status: 503,
                body: "bridge unavailable".to_string(),
            });
        }

        Ok(CallReceipt {
            call_sid: Some("CA-ok".to_string()),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "FailingPlacer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telephony::ReminderInfo;

    fn request(phone: &str) -> OutboundCallRequest {
        OutboundCallRequest::reminder(
            phone,
            ReminderInfo {
                what: "Exercise routine".to_string(),
                time: "6:00 AM".to_string(),
                frequency: "daily".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_fails_everything_by_default() {
        let placer = FailingPlacer::new();
        let err = placer.place_call(&request("+14155550001")).await.unwrap_err();
        assert!(matches!(err, TelephonyError::Status { status: 503, .. }));
        assert_eq!(placer.attempts(), 1);
    }

    #[tokio::test]
    async fn test_fails_only_listed_numbers() {
        let placer = FailingPlacer::for_numbers(["+14155550001"]);
        assert!(placer.place_call(&request("+14155550001")).await.is_err());
        assert!(placer.place_call(&request("+14155550002")).await.is_ok());
        assert_eq!(placer.attempts(), 2);
    }
}
