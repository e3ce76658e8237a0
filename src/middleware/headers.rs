//! Header helpers used around the inner service call.
//!
//! [`is_protocol_upgrade`] detects WebSocket handshakes, which the
//! interceptor leaves alone. [`append_correlation_id`] and
//! [`expose_header`] apply the outbound contract: the ID is appended next
//! to any value the application already set, and the header name is
//! merged into `Access-Control-Expose-Headers` so browser scripts can
//! read it.

use http::header::{ACCESS_CONTROL_EXPOSE_HEADERS, UPGRADE};
use http::{HeaderMap, HeaderName, HeaderValue};

/// `true` when the request asks to switch to the WebSocket protocol.
#[must_use]
pub fn is_protocol_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get_all(UPGRADE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("websocket"))
}

/// Read a header value as text, decoding bytes outside visible ASCII as
/// latin-1 so that no inbound value is unreadable.
#[must_use]
pub fn decode_value(value: &HeaderValue) -> String {
    match value.to_str() {
        Ok(text) => text.to_string(),
        Err(_) => value.as_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}

/// Inverse of [`decode_value`]. `None` when `id` holds characters past
/// U+00FF or bytes a header value may not carry.
#[must_use]
pub fn encode_value(id: &str) -> Option<HeaderValue> {
    if let Ok(value) = HeaderValue::from_str(id) {
        return Some(value);
    }
    let bytes = id
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    HeaderValue::from_bytes(&bytes).ok()
}

/// Overwrite `name` on the inbound request with a single `id` value.
///
/// Returns `false` when `id` cannot be encoded as a header value.
pub fn replace_request_header(headers: &mut HeaderMap, name: &HeaderName, id: &str) -> bool {
    match encode_value(id) {
        Some(value) => {
            headers.insert(name.clone(), value);
            true
        }
        None => false,
    }
}

/// Append `id` under `name`, keeping values already present.
///
/// Returns `false` when `id` cannot be encoded as a header value.
pub fn append_correlation_id(headers: &mut HeaderMap, name: &HeaderName, id: &str) -> bool {
    match encode_value(id) {
        Some(value) => {
            headers.append(name.clone(), value);
            true
        }
        None => false,
    }
}

/// Make sure `Access-Control-Expose-Headers` lists `display_name`.
///
/// Existing entries keep their order. Several header lines are folded
/// into one comma-separated value. Nothing is added when the name is
/// already listed (case-insensitively).
pub fn expose_header(headers: &mut HeaderMap, display_name: &str) {
    let existing: Vec<&str> = headers
        .get_all(ACCESS_CONTROL_EXPOSE_HEADERS)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    let already_listed = existing
        .iter()
        .flat_map(|v| v.split(','))
        .any(|entry| entry.trim().eq_ignore_ascii_case(display_name));
    if already_listed {
        return;
    }

    let merged = if existing.is_empty() {
        display_name.to_string()
    } else {
        format!("{}, {display_name}", existing.join(", "))
    };

    if let Ok(value) = HeaderValue::from_str(&merged) {
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value);
    }
}
