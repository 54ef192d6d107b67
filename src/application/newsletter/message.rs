//! Decoding of list-service status messages.

use html_escape::decode_html_entities;

/// Unwrap and entity-decode a raw list-service message for display.
///
/// The service prefixes soft errors with a machine-readable code, as in
/// `0 - Already subscribed`. A `0` code marks everything after the first `-`
/// as the human-readable text; any other shape is displayed whole.
pub fn decode_display_message(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let payload = match raw.split_once('-') {
        Some((code, remainder)) if code.trim() == "0" => remainder,
        _ => raw,
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    Some(decode_html_entities(payload).into_owned())
}
