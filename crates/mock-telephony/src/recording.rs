//! Recording placer - accepts every call and keeps a copy of the request.

use std::sync::{Arc, Mutex};

use telephony::{async_trait, CallPlacer, CallReceipt, OutboundCallRequest, TelephonyError};

/// A placer that accepts every call and records the requests it saw.
///
/// Clones share the same record, so a test can hand one clone to the
/// scheduler and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlacer {
    calls: Arc<Mutex<Vec<OutboundCallRequest>>>,
}

impl RecordingPlacer {
    /// Create a new RecordingPlacer with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests received so far, in order.
    pub fn calls(&self) -> Vec<OutboundCallRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CallPlacer for RecordingPlacer {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<CallReceipt, TelephonyError> {
        let n = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| TelephonyError::Rejected("record poisoned".to_string()))?;
            calls.push(request.clone());
            calls.len()
        };

        Ok(CallReceipt {
            call_sid: Some(format!("CA-mock-{}", n)),
            call_id: Some(format!("call-mock-{}", n)),
            status: Some("queued".to_string()),
        })
    }

    fn name(&self) -> &str {
        "RecordingPlacer"
    }
}
