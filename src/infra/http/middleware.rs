use std::time::Instant;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorTrace;

const METRIC_HTTP_REQUESTS: &str = "vetrina_http_requests_total";

/// Per-request correlation id, attached to both the request and its response.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
}

impl RequestContext {
    fn issue() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::issue();
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id)
        .unwrap_or_default();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let status = response.status();
    counter!(METRIC_HTTP_REQUESTS, "class" => status_class(status)).increment(1);
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let trace = response.extensions_mut().remove::<ErrorTrace>();
    log_failure(
        status,
        &method,
        &uri,
        request_id,
        start.elapsed().as_millis(),
        trace,
    );
    response
}

fn log_failure(
    status: StatusCode,
    method: &Method,
    uri: &Uri,
    request_id: Uuid,
    elapsed_ms: u128,
    trace: Option<ErrorTrace>,
) {
    let (origin, chain) = match trace {
        Some(trace) => (trace.origin, trace.chain),
        None => ("unknown", Vec::new()),
    };
    let detail = chain
        .first()
        .cloned()
        .unwrap_or_else(|| "no diagnostic available".to_string());

    if status.is_server_error() {
        error!(
            target = "vetrina::http::response",
            status = status.as_u16(),
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed_ms,
            origin = origin,
            detail = %detail,
            chain = ?chain,
            request_id = %request_id,
            "request failed",
        );
    } else {
        warn!(
            target = "vetrina::http::response",
            status = status.as_u16(),
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed_ms,
            origin = origin,
            detail = %detail,
            chain = ?chain,
            request_id = %request_id,
            "client request error",
        );
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}
