use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::{
        chrome::{ActivePage, ChromeService},
        error::AppError,
        newsletter::NewsletterService,
        site::SiteService,
    },
    domain::error::DomainError,
    presentation::views::{
        DocPageContext, DocPageTemplate, IndexTemplate, LandingContext, LayoutChrome,
        LayoutContext, render_not_found_response, render_template_response,
    },
};

use super::{
    middleware::{log_responses, set_request_context},
    newsletter,
};

#[derive(Clone)]
pub struct HttpState {
    pub site: Arc<SiteService>,
    pub chrome: Arc<ChromeService>,
    pub newsletter: Arc<NewsletterService>,
    pub trust_remote_markup: bool,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/docs/{slug}", get(doc_page))
        .route("/healthz", get(healthz))
        .route("/assets/code.css", get(code_stylesheet))
        .route("/assets/{*path}", get(crate::infra::assets::serve_public))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/newsletter/key", post(newsletter::key_event))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn landing(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load(ActivePage::Landing);

    match state.site.landing() {
        Ok(content) => {
            let chrome = apply_canonical(chrome, &state.chrome, "/");
            let view = LayoutContext::new(chrome, LandingContext::from_content(&content));
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => err.into_response(),
    }
}

async fn doc_page(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let chrome = state.chrome.load(ActivePage::Doc(&slug));

    match state.site.doc(&slug) {
        Ok(content) => {
            let chrome = apply_canonical(chrome, &state.chrome, &format!("/docs/{slug}"));
            let meta = doc_meta(&chrome, content.page.title, content.page.lead);
            let view = LayoutContext::new(
                chrome.with_meta(meta),
                DocPageContext::from_content(&content),
            );
            render_template_response(DocPageTemplate { view }, StatusCode::OK)
        }
        Err(AppError::Domain(DomainError::UnknownDocument { .. })) => {
            render_not_found_response(chrome)
        }
        Err(err) => err.into_response(),
    }
}

async fn fallback_router(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.load(ActivePage::None))
}

async fn healthz() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn code_stylesheet(State(state): State<HttpState>) -> Response {
    css_response(state.site.code_stylesheet())
}

fn apply_canonical(chrome: LayoutChrome, service: &ChromeService, path: &str) -> LayoutChrome {
    match service.canonical_for(path) {
        Some(canonical) => chrome.with_canonical(canonical),
        None => chrome,
    }
}

fn doc_meta(
    chrome: &LayoutChrome,
    title: &str,
    lead: &str,
) -> crate::presentation::views::PageMetaView {
    let description = fallback_description(lead, &chrome.meta.description);
    chrome
        .meta
        .clone()
        .with_content(format!("{title} · {}", chrome.brand.title), description)
}

fn fallback_description(candidate: &str, fallback: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn css_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/css; charset=utf-8")
        .header(CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
