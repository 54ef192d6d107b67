use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use vetrina::application::chrome::ChromeService;
use vetrina::application::highlight::highlight_service;
use vetrina::application::newsletter::{
    ListTransport, NewsletterService, StatusUpdate, SubscribeHandle, SubscribePayload,
};
use vetrina::application::site::SiteService;
use vetrina::config::SiteSettings;
use vetrina::infra::http::{HttpState, build_router};

#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<SubscribePayload>>,
}

#[async_trait]
impl ListTransport for RecordingTransport {
    async fn subscribe(&self, payload: SubscribePayload) -> SubscribeHandle {
        self.requests.lock().unwrap().push(payload);
        let (_tx, updates) = mpsc::channel(1);
        SubscribeHandle {
            accepted: true,
            updates,
        }
    }
}

struct ScriptedTransport {
    script: Vec<StatusUpdate>,
}

#[async_trait]
impl ListTransport for ScriptedTransport {
    async fn subscribe(&self, _payload: SubscribePayload) -> SubscribeHandle {
        let (tx, updates) = mpsc::channel(self.script.len().max(1));
        for update in &self.script {
            tx.send(update.clone())
                .await
                .expect("script fits the channel");
        }
        SubscribeHandle {
            accepted: true,
            updates,
        }
    }
}

/// Hands out update senders without sending anything, so a test controls when
/// each in-flight submission resolves.
#[derive(Default)]
struct GatedTransport {
    slots: Mutex<Vec<mpsc::Sender<StatusUpdate>>>,
}

impl GatedTransport {
    fn sender(&self, index: usize) -> mpsc::Sender<StatusUpdate> {
        self.slots.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ListTransport for GatedTransport {
    async fn subscribe(&self, _payload: SubscribePayload) -> SubscribeHandle {
        let (tx, updates) = mpsc::channel(4);
        self.slots.lock().unwrap().push(tx);
        SubscribeHandle {
            accepted: true,
            updates,
        }
    }
}

fn newsletter_router(transport: Arc<dyn ListTransport>, trust_remote_markup: bool) -> Router {
    let site = Arc::new(SiteService::new(highlight_service()));
    site.warm().expect("compiled-in content should render");

    let state = HttpState {
        site,
        chrome: Arc::new(ChromeService::new(SiteSettings { base_url: None })),
        newsletter: Arc::new(NewsletterService::new(transport)),
        trust_remote_markup,
    };

    build_router(state)
}

async fn post_form(router: &Router, uri: &str, body: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn empty_address_patches_the_local_error_without_contacting_the_transport() {
    let recorder = Arc::new(RecordingTransport::default());
    let router = newsletter_router(recorder.clone(), true);

    let response = post_form(&router, "/newsletter/subscribe", "email=&consent=on").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Please enter a valid email address"));
    assert!(recorder.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_signup_streams_sending_then_the_decoded_confirmation() {
    let transport = Arc::new(ScriptedTransport {
        script: vec![
            StatusUpdate::sending(),
            StatusUpdate::success("0 - Thanks for subscribing!"),
        ],
    });
    let router = newsletter_router(transport, true);

    let response = post_form(
        &router,
        "/newsletter/subscribe",
        "email=user%40example.com&consent=on",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    let sending = body.find("Sending...").expect("sending patch present");
    let confirmed = body
        .find("Thanks for subscribing!")
        .expect("confirmation patch present");
    assert!(sending < confirmed);
    assert!(body.contains("newsletter-confirmed"));
}

#[tokio::test]
async fn remote_rejections_surface_the_decoded_message() {
    let transport = Arc::new(ScriptedTransport {
        script: vec![
            StatusUpdate::sending(),
            StatusUpdate::error("0 - Already subscribed"),
        ],
    });
    let router = newsletter_router(transport, true);

    let response = post_form(
        &router,
        "/newsletter/subscribe",
        "email=user%40example.com&consent=on",
    )
    .await;

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Already subscribed"));
    assert!(body.contains("newsletter-error"));
}

#[tokio::test]
async fn untrusted_deployments_scrub_markup_out_of_remote_messages() {
    let transport = Arc::new(ScriptedTransport {
        script: vec![
            StatusUpdate::sending(),
            StatusUpdate::success("0 - <b>Done</b><script>alert(1)</script>"),
        ],
    });
    let router = newsletter_router(transport, false);

    let response = post_form(
        &router,
        "/newsletter/subscribe",
        "email=user%40example.com",
    )
    .await;

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("<b>Done</b>"));
    assert!(!body.contains("<script"));
}

#[tokio::test]
async fn the_commit_key_submits_the_form() {
    let transport = Arc::new(ScriptedTransport {
        script: vec![
            StatusUpdate::sending(),
            StatusUpdate::success("0 - Welcome aboard"),
        ],
    });
    let router = newsletter_router(transport, true);

    let response = post_form(
        &router,
        "/newsletter/key?key=Enter",
        "email=user%40example.com&consent=on",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Sending..."));
    assert!(body.contains("Welcome aboard"));
}

#[tokio::test]
async fn other_keys_patch_the_status_without_submitting() {
    let recorder = Arc::new(RecordingTransport::default());
    let router = newsletter_router(recorder.clone(), true);

    let response = post_form(&router, "/newsletter/key?key=a", "email=").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("newsletter-status"));
    assert!(!body.contains("Sending..."));
    assert!(recorder.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn a_newer_submission_silences_the_stream_of_the_older_one() {
    let transport = Arc::new(GatedTransport::default());
    let router = newsletter_router(transport.clone(), true);

    let first_router = router.clone();
    let first = tokio::spawn(async move {
        let response = post_form(
            &first_router,
            "/newsletter/subscribe",
            "email=first%40example.com",
        )
        .await;
        body_to_string(response.into_body()).await
    });
    wait_for_submissions(&transport, 1).await;

    let second_router = router.clone();
    let second = tokio::spawn(async move {
        let response = post_form(
            &second_router,
            "/newsletter/subscribe",
            "email=second%40example.com",
        )
        .await;
        body_to_string(response.into_body()).await
    });
    wait_for_submissions(&transport, 2).await;

    let fresh = transport.sender(1);
    fresh
        .send(StatusUpdate::success("0 - Fresh attempt confirmed"))
        .await
        .expect("second stream accepts updates");
    drop(fresh);

    let second_body = second.await.expect("second request completes");
    assert!(second_body.contains("Fresh attempt confirmed"));

    let stale = transport.sender(0);
    stale
        .send(StatusUpdate::error("0 - Stale attempt error"))
        .await
        .expect("first stream accepts updates");
    drop(stale);

    let first_body = first.await.expect("first request completes");
    assert!(!first_body.contains("Stale attempt error"));
}

async fn wait_for_submissions(transport: &GatedTransport, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if transport.slots.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("transport should be contacted in time");
}
