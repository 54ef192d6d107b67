//! Builders for the datastar SSE responses the form endpoints answer with.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, PatchElements};

/// Build one element patch targeting the supplied selector.
pub fn element_patch(html: String, selector: &str, mode: ElementPatchMode) -> Event {
    PatchElements::new(html)
        .selector(selector)
        .mode(mode)
        .write_as_axum_sse_event()
}

/// Answer a request with a finite sequence of pre-built events. The SSE body
/// closes once the last event is written, so callers can collect it.
pub fn finite_sse(events: Vec<Event>) -> Response {
    let updates = stream! {
        for event in events {
            yield Ok::<Event, Infallible>(event);
        }
    };
    Sse::new(updates).into_response()
}
