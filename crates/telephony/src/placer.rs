//! The CallPlacer trait definition.

use async_trait::async_trait;

use crate::error::TelephonyError;
use crate::types::{CallReceipt, OutboundCallRequest};

/// Something that can place an outbound reminder call.
///
/// The HTTP bridge client is the production implementation; the
/// `mock-telephony` crate provides test doubles. This trait is object-safe
/// and can be used with `Arc<dyn CallPlacer>`.
#[async_trait]
pub trait CallPlacer: Send + Sync {
    /// Trigger a call. A returned receipt means the bridge accepted it.
    async fn place_call(&self, request: &OutboundCallRequest)
        -> Result<CallReceipt, TelephonyError>;

    /// Get a human-readable name for this implementation.
    fn name(&self) -> &str;
}
