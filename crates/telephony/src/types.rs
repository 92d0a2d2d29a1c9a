//! Request and response types for the outbound call endpoint.

use serde::{Deserialize, Serialize};

/// Reminder content passed to the bridge as call metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderInfo {
    pub what: String,
    pub time: String,
    pub frequency: String,
}

/// Body of `POST /api/telephony/outbound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallRequest {
    /// E.164 number to call.
    pub phone_number: String,
    pub reminder_info: ReminderInfo,
    /// Sent as the `Idempotency-Key` header, not in the body.
    #[serde(skip)]
    pub idempotency_key: Option<String>,
}

impl OutboundCallRequest {
    /// Create a reminder call request.
    pub fn reminder(phone_number: impl Into<String>, reminder_info: ReminderInfo) -> Self {
        Self {
            phone_number: phone_number.into(),
            reminder_info,
            idempotency_key: None,
        }
    }

    /// Attach a key the bridge can use to drop duplicate deliveries.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Response body from the bridge. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallResponse {
    pub success: Option<bool>,
    pub call_sid: Option<String>,
    #[serde(alias = "ultravoxCallId")]
    pub call_id: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

/// Identifiers of a call the bridge accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallReceipt {
    /// Carrier call identifier.
    pub call_sid: Option<String>,
    /// Voice agent call identifier.
    pub call_id: Option<String>,
    pub status: Option<String>,
}

impl CallReceipt {
    /// The most specific identifier available for this call.
    pub fn reference(&self) -> Option<&str> {
        self.call_sid.as_deref().or(self.call_id.as_deref())
    }
}

impl From<OutboundCallResponse> for CallReceipt {
    fn from(resp: OutboundCallResponse) -> Self {
        Self {
            call_sid: resp.call_sid,
            call_id: resp.call_id,
            status: resp.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = OutboundCallRequest::reminder(
            "+14155550123",
            ReminderInfo {
                what: "Take medicine".to_string(),
                time: "9:00 AM".to_string(),
                frequency: "daily".to_string(),
            },
        )
        .with_idempotency_key("reminder_1:1000");

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "phoneNumber": "+14155550123",
                "reminderInfo": {
                    "what": "Take medicine",
                    "time": "9:00 AM",
                    "frequency": "daily"
                }
            })
        );
    }

    #[test]
    fn test_response_accepts_voice_call_id_alias() {
        let resp: OutboundCallResponse = serde_json::from_str(
            r#"{"success":true,"callSid":"CA1","ultravoxCallId":"uv-9","status":"queued"}"#,
        )
        .unwrap();
        let receipt = CallReceipt::from(resp);
        assert_eq!(receipt.call_id.as_deref(), Some("uv-9"));
        assert_eq!(receipt.reference(), Some("CA1"));
    }

    #[test]
    fn test_receipt_reference_falls_back_to_call_id() {
        let receipt = CallReceipt {
            call_id: Some("uv-1".to_string()),
            ..Default::default()
        };
        assert_eq!(receipt.reference(), Some("uv-1"));
        assert_eq!(CallReceipt::default().reference(), None);
    }
}
