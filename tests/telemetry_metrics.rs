use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use metrics_util::debugging::DebuggingRecorder;
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

#[tokio::test]
async fn served_pages_and_submissions_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug recorder installs once for this test binary");

    // Warming the site renders every compiled-in code block.
    let site = Arc::new(SiteService::new(highlight_service()));
    site.warm().expect("compiled-in content should render");

    let state = HttpState {
        site,
        chrome: Arc::new(ChromeService::new(SiteSettings { base_url: None })),
        newsletter: Arc::new(NewsletterService::new(Arc::new(ScriptedTransport {
            script: vec![
                StatusUpdate::sending(),
                StatusUpdate::success("0 - Thanks for subscribing!"),
            ],
        }))),
        trust_remote_markup: true,
    };
    let app = build_router(state);

    let landing = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .expect("request should build");
    let response = app
        .clone()
        .oneshot(landing)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let subscribe = Request::builder()
        .method(Method::POST)
        .uri("/newsletter/subscribe")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=user%40example.com&consent=on"))
        .expect("request should build");
    let response = app
        .clone()
        .oneshot(subscribe)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
    let _ = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();

    let expected = [
        "vetrina_highlight_blocks_total",
        "vetrina_http_requests_total",
        "vetrina_newsletter_submissions_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
