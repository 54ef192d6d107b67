use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;
use url::Url;

use vetrina::application::chrome::ChromeService;
use vetrina::application::highlight::highlight_service;
use vetrina::application::newsletter::{
    ListTransport, NewsletterService, SubscribeHandle, SubscribePayload,
};
use vetrina::application::site::SiteService;
use vetrina::config::SiteSettings;
use vetrina::infra::http::{HttpState, build_router};

struct UnusedTransport;

#[async_trait]
impl ListTransport for UnusedTransport {
    async fn subscribe(&self, _payload: SubscribePayload) -> SubscribeHandle {
        let (_tx, updates) = mpsc::channel(1);
        SubscribeHandle {
            accepted: false,
            updates,
        }
    }
}

fn test_router(base_url: Option<&str>) -> Router {
    let site = Arc::new(SiteService::new(highlight_service()));
    site.warm().expect("compiled-in content should render");

    let state = HttpState {
        site,
        chrome: Arc::new(ChromeService::new(SiteSettings {
            base_url: base_url.map(|value| Url::parse(value).expect("valid base url")),
        })),
        newsletter: Arc::new(NewsletterService::new(Arc::new(UnusedTransport))),
        trust_remote_markup: true,
    };

    build_router(state)
}

async fn get(router: &Router, uri: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
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
async fn landing_page_renders_hero_and_showcase() {
    let router = test_router(None);
    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Your project,"));
    assert!(body.contains("ready to show."));
    assert!(body.contains("Get started"));
    assert!(body.contains("vetrina.toml"));
    assert!(body.contains("class=\"syntax-highlight"));
    assert!(body.contains("id=\"newsletter-status\""));
    assert!(!body.contains("rel=\"canonical\""));
}

#[tokio::test]
async fn landing_page_carries_a_canonical_link_when_a_base_url_is_set() {
    let router = test_router(Some("https://vetrina.example.com"));
    let response = get(&router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("rel=\"canonical\""));
    assert!(body.contains("href=\"https://vetrina.example.com/\""));
}

#[tokio::test]
async fn doc_pages_render_with_their_sidebar_entry_active() {
    let router = test_router(None);
    let response = get(&router, "/docs/installation").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("aria-current=\"page\""));
    assert!(body.contains("Installation"));
    assert!(body.contains("class=\"syntax-highlight"));
}

#[tokio::test]
async fn unknown_documents_serve_the_styled_not_found_page() {
    let router = test_router(None);
    let response = get(&router, "/docs/missing-forever").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Page Not Found"));
    assert!(body.contains("Back to home"));
}

#[tokio::test]
async fn unknown_routes_serve_the_styled_not_found_page() {
    let router = test_router(None);
    let response = get(&router, "/definitely/not/here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains("Page Not Found"));
}

#[tokio::test]
async fn healthz_replies_no_content() {
    let router = test_router(None);
    let response = get(&router, "/healthz").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn code_stylesheet_is_generated_from_the_style_table() {
    let router = test_router(None);
    let response = get(&router, "/assets/code.css").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));

    let body = body_to_string(response.into_body()).await;
    assert!(body.contains(".syntax-"));
}

#[tokio::test]
async fn bundled_assets_are_served_with_immutable_caching() {
    let router = test_router(None);
    let response = get(&router, "/assets/styles/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(cache_control.contains("immutable"));
}

#[tokio::test]
async fn asset_paths_reaching_outside_the_bundle_are_not_found() {
    let router = test_router(None);
    let response = get(&router, "/assets/styles/../../Cargo.toml").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
