//! Embedded static assets, baked in from the build script's staging area.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, File, include_dir};

use crate::application::error::ErrorTrace;

static PUBLIC_ASSETS: Dir<'_> = include_dir!("$OUT_DIR/static_public");

/// Bundle contents only change with a new binary, so clients may cache them
/// for as long as they like.
const CACHE_POLICY: &str = "public, max-age=31536000, immutable";

/// Serve one file from the embedded public bundle.
pub async fn serve_public(path: Option<Path<String>>) -> Response {
    let requested = path.map(|Path(value)| value).unwrap_or_default();
    match lookup(&requested) {
        Some(file) => asset_response(file),
        None => missing_asset_response(),
    }
}

/// Resolve a request path inside the bundle. Directory listings and any path
/// carrying a parent-directory component count as absent.
fn lookup(requested: &str) -> Option<&'static File<'static>> {
    let normalized = requested.trim_start_matches('/');
    if normalized.is_empty() || normalized.ends_with('/') || normalized.contains("..") {
        return None;
    }
    PUBLIC_ASSETS.get_file(normalized)
}

fn asset_response(file: &'static File<'static>) -> Response {
    let mime = mime_guess::from_path(file.path()).first_or_octet_stream();

    let mut response = Response::new(Body::from(Bytes::from_static(file.contents())));
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_POLICY));
    response
}

fn missing_asset_response() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    ErrorTrace::message("infra::assets::serve_public", "Static asset not found")
        .attach(&mut response);
    response
}
