//! Transport seam for the mailing-list service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use super::form::RemoteStatus;

/// Merge-field identifier the list service uses for GDPR marketing consent.
pub const GDPR_CONSENT_FIELD_ID: &str = "1534";

const CONSENT_GRANTED: &str = "Y";
const CONSENT_WITHHELD: &str = "";

/// Wire payload for a subscription request. Field names follow the list
/// service's merge-field conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribePayload {
    #[serde(rename = "EMAIL")]
    pub email: String,
    pub gdpr: BTreeMap<String, String>,
}

impl SubscribePayload {
    pub fn new(email: impl Into<String>, consent: bool) -> Self {
        let mut gdpr = BTreeMap::new();
        gdpr.insert(
            GDPR_CONSENT_FIELD_ID.to_owned(),
            if consent { CONSENT_GRANTED } else { CONSENT_WITHHELD }.to_owned(),
        );
        Self {
            email: email.into(),
            gdpr,
        }
    }

    /// The marker recorded under the consent merge field.
    pub fn consent_marker(&self) -> &str {
        self.gdpr
            .get(GDPR_CONSENT_FIELD_ID)
            .map(String::as_str)
            .unwrap_or(CONSENT_WITHHELD)
    }
}

/// One asynchronous status report from the list service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: RemoteStatus,
    pub message: Option<String>,
}

impl StatusUpdate {
    pub fn sending() -> Self {
        Self {
            status: RemoteStatus::Sending,
            message: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: RemoteStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RemoteStatus::Error,
            message: Some(message.into()),
        }
    }
}

/// A dispatched subscription request.
#[derive(Debug)]
pub struct SubscribeHandle {
    /// Immediate accept signal, independent of the status updates that
    /// resolve the submission later.
    pub accepted: bool,
    /// Status reports, beginning with `sending` and ending with a terminal
    /// `success` or `error`.
    pub updates: mpsc::Receiver<StatusUpdate>,
}

/// Outbound side of the signup flow. Transport failures surface as `error`
/// status updates, never as a dispatch-time panic or error value.
#[async_trait]
pub trait ListTransport: Send + Sync {
    async fn subscribe(&self, payload: SubscribePayload) -> SubscribeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_records_consent_under_the_fixed_field() {
        let granted = SubscribePayload::new("user@example.com", true);
        assert_eq!(granted.email, "user@example.com");
        assert_eq!(granted.gdpr.get(GDPR_CONSENT_FIELD_ID).map(String::as_str), Some("Y"));
        assert_eq!(granted.consent_marker(), "Y");

        let withheld = SubscribePayload::new("user@example.com", false);
        assert_eq!(withheld.consent_marker(), "");
    }

    #[test]
    fn payload_serializes_with_service_field_names() {
        let payload = SubscribePayload::new("user@example.com", true);
        let json = serde_json::to_value(&payload).expect("payload serializes");

        assert_eq!(json["EMAIL"], "user@example.com");
        assert_eq!(json["gdpr"][GDPR_CONSENT_FIELD_ID], "Y");
    }
}
