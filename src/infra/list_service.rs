//! Outbound transport to the hosted mailing-list service.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use crate::application::newsletter::{
    ListTransport, StatusUpdate, SubscribeHandle, SubscribePayload,
};
use crate::config::NewsletterSettings;
use crate::infra::error::InfraError;

const METRIC_LIST_SERVICE_RTT: &str = "vetrina_list_service_rtt_ms";

/// Room for the `sending` report plus the terminal report.
const UPDATE_CHANNEL_CAPACITY: usize = 4;

const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "The subscription service could not be reached. Please try again later.";
const NOT_CONFIGURED_MESSAGE: &str =
    "Newsletter subscriptions are not configured for this site.";

/// Reply shape of the list service's `post-json` endpoint.
#[derive(Debug, Deserialize)]
struct ListServiceReply {
    result: String,
    msg: Option<String>,
}

/// Relays subscriptions to a Mailchimp-compatible list endpoint.
///
/// Fields are posted form-encoded to the `post-json` variant of the
/// configured subscribe URL; the JSON reply carries `{ result, msg }` where
/// `msg` may use the `"0 - ..."` prefix convention decoded downstream.
pub struct MailchimpTransport {
    client: Client,
    endpoint: Url,
}

impl MailchimpTransport {
    pub fn new(subscribe_url: Url, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::configuration(format!("list service client: {err}")))?;

        Ok(Self {
            client,
            endpoint: post_json_endpoint(&subscribe_url),
        })
    }
}

#[async_trait]
impl ListTransport for MailchimpTransport {
    async fn subscribe(&self, payload: SubscribePayload) -> SubscribeHandle {
        let (tx, updates) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        // A dropped receiver means the submission was superseded; relay
        // failures are not worth surfacing anywhere else.
        tokio::spawn(async move {
            let _ = tx.send(StatusUpdate::sending()).await;
            let _ = tx.send(dispatch(&client, endpoint, &payload).await).await;
        });

        SubscribeHandle {
            accepted: true,
            updates,
        }
    }
}

async fn dispatch(client: &Client, endpoint: Url, payload: &SubscribePayload) -> StatusUpdate {
    let started_at = Instant::now();
    let outcome = client.post(endpoint).form(&wire_fields(payload)).send().await;
    histogram!(METRIC_LIST_SERVICE_RTT).record(started_at.elapsed().as_secs_f64() * 1000.0);

    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(
                target = "vetrina::newsletter",
                error = %err,
                "List service request failed"
            );
            return StatusUpdate::error(SERVICE_UNAVAILABLE_MESSAGE);
        }
    };

    let status = response.status();
    match response.json::<ListServiceReply>().await {
        Ok(reply) if reply.result == "success" => {
            StatusUpdate::success(reply.msg.unwrap_or_default())
        }
        Ok(reply) => {
            debug!(
                target = "vetrina::newsletter",
                result = %reply.result,
                "List service rejected the subscription"
            );
            StatusUpdate::error(
                reply
                    .msg
                    .unwrap_or_else(|| SERVICE_UNAVAILABLE_MESSAGE.to_owned()),
            )
        }
        Err(err) => {
            warn!(
                target = "vetrina::newsletter",
                error = %err,
                http_status = %status,
                "List service reply could not be parsed"
            );
            StatusUpdate::error(SERVICE_UNAVAILABLE_MESSAGE)
        }
    }
}

/// Flatten the payload into the form fields the list service expects:
/// `EMAIL=<address>` plus one `gdpr[<field>]=<marker>` pair per merge field.
fn wire_fields(payload: &SubscribePayload) -> Vec<(String, String)> {
    let mut fields = vec![("EMAIL".to_owned(), payload.email.clone())];
    for (field, marker) in &payload.gdpr {
        fields.push((format!("gdpr[{field}]"), marker.clone()));
    }
    fields
}

/// The subscribe URL is published for browser form posts; the JSON variant
/// lives at the sibling `post-json` path with the same query string.
fn post_json_endpoint(subscribe_url: &Url) -> Url {
    let mut endpoint = subscribe_url.clone();
    let segments: Vec<String> = endpoint
        .path_segments()
        .map(|parts| {
            parts
                .map(|segment| {
                    if segment == "post" {
                        "post-json".to_owned()
                    } else {
                        segment.to_owned()
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    if !segments.is_empty() {
        endpoint.set_path(&segments.join("/"));
    }
    endpoint
}

/// Stand-in transport used when no subscribe URL is configured. Dispatches
/// are rejected and the status stream resolves straight to a configuration
/// error.
pub struct DisabledTransport;

#[async_trait]
impl ListTransport for DisabledTransport {
    async fn subscribe(&self, _payload: SubscribePayload) -> SubscribeHandle {
        let (tx, updates) = mpsc::channel(1);
        let _ = tx.send(StatusUpdate::error(NOT_CONFIGURED_MESSAGE)).await;

        SubscribeHandle {
            accepted: false,
            updates,
        }
    }
}

/// Build the transport the settings call for.
pub fn list_transport_from_settings(
    settings: &NewsletterSettings,
) -> Result<std::sync::Arc<dyn ListTransport>, InfraError> {
    match settings.subscribe_url.as_ref() {
        Some(url) => Ok(std::sync::Arc::new(MailchimpTransport::new(
            url.clone(),
            settings.timeout,
        )?)),
        None => {
            warn!(
                target = "vetrina::newsletter",
                "No subscribe URL configured; newsletter dispatch disabled"
            );
            Ok(std::sync::Arc::new(DisabledTransport))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_the_post_segment_and_keeps_the_query() {
        let url = Url::parse(
            "https://updates.example.com/subscribe/post?u=a623b400e0bcf18e&id=5709d9f4a4",
        )
        .expect("valid URL");

        let endpoint = post_json_endpoint(&url);

        assert_eq!(endpoint.path(), "/subscribe/post-json");
        assert_eq!(endpoint.query(), Some("u=a623b400e0bcf18e&id=5709d9f4a4"));
    }

    #[test]
    fn leaves_unrecognized_paths_alone() {
        let url = Url::parse("https://updates.example.com/hooks/subscribe").expect("valid URL");

        let endpoint = post_json_endpoint(&url);

        assert_eq!(endpoint.path(), "/hooks/subscribe");
    }

    #[test]
    fn flattens_merge_fields_for_the_wire() {
        let payload = SubscribePayload::new("user@example.com", true);

        let fields = wire_fields(&payload);

        assert_eq!(fields[0], ("EMAIL".to_owned(), "user@example.com".to_owned()));
        assert!(fields.contains(&("gdpr[1534]".to_owned(), "Y".to_owned())));
    }

    #[tokio::test]
    async fn disabled_transport_rejects_and_reports_configuration_error() {
        let mut handle = DisabledTransport
            .subscribe(SubscribePayload::new("user@example.com", false))
            .await;

        assert!(!handle.accepted);
        let update = handle.updates.recv().await.expect("one status update");
        assert_eq!(update.status, crate::application::newsletter::RemoteStatus::Error);
        assert_eq!(update.message.as_deref(), Some(NOT_CONFIGURED_MESSAGE));
    }
}
