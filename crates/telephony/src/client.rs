//! Telephony bridge HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::TelephonyConfig;
use crate::error::TelephonyError;
use crate::placer::CallPlacer;
use crate::types::{CallReceipt, OutboundCallRequest, OutboundCallResponse};

/// Header carrying the per-occurrence deduplication key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Client for the outbound call endpoint of the telephony bridge.
#[derive(Clone)]
pub struct TelephonyClient {
    http: Client,
    config: TelephonyConfig,
}

impl TelephonyClient {
    /// Build a client. No request is made until a call is placed.
    pub fn new(config: TelephonyConfig) -> Result<Self, TelephonyError> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TelephonyError::Http)?;

        info!(base_url = %config.base_url, "Telephony client ready");
        Ok(Self { http, config })
    }

    /// Trigger an outbound reminder call.
    ///
    /// A non-2xx status, a body that is not JSON, or a JSON body with
    /// `"success": false` are all errors. An empty 2xx body is accepted.
    pub async fn place_outbound_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<CallReceipt, TelephonyError> {
        let url = self.config.outbound_url();
        debug!(
            phone = %request.phone_number,
            idempotency_key = ?request.idempotency_key,
            "POST {}",
            url
        );

        let mut builder = self.http.post(&url).json(request);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key);
        }

        let response = builder.send().await.map_err(TelephonyError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Outbound call endpoint returned an error");
            return Err(TelephonyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(TelephonyError::Http)?;
        let parsed: OutboundCallResponse = if body.trim().is_empty() {
            OutboundCallResponse::default()
        } else {
            serde_json::from_str(&body)?
        };

        if parsed.success == Some(false) {
            return Err(TelephonyError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "bridge reported failure".to_string()),
            ));
        }

        let receipt = CallReceipt::from(parsed);
        info!(
            phone = %request.phone_number,
            call_sid = ?receipt.call_sid,
            call_id = ?receipt.call_id,
            "Outbound call initiated"
        );
        Ok(receipt)
    }

    /// Get the configuration.
    pub fn config(&self) -> &TelephonyConfig {
        &self.config
    }
}

#[async_trait]
impl CallPlacer for TelephonyClient {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<CallReceipt, TelephonyError> {
        self.place_outbound_call(request).await
    }

    fn name(&self) -> &str {
        "telephony-bridge"
    }
}

impl std::fmt::Debug for TelephonyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelephonyClient")
            .field("config", &self.config)
            .finish()
    }
}
