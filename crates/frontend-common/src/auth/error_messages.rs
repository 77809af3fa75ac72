//! User-facing error messages

use jobboard_http::{ClientError, ErrorKind};

/// Best-effort human readable message for a failed request
///
/// Prefers the `message` field of the server's JSON payload. Conflicts and
/// forbidden responses with a plain-text body are shown verbatim; anything else
/// falls back to `fallback`.
pub fn user_message(error: &ClientError, fallback: &str) -> String {
    if let Some(message) = error.payload_message() {
        return message;
    }

    match error.kind() {
        ErrorKind::Conflict | ErrorKind::Forbidden => error
            .body()
            .map(str::trim)
            .filter(|body| !body.is_empty() && !body.starts_with('{'))
            .map_or_else(|| fallback.to_string(), str::to_string),
        ErrorKind::Unauthorized | ErrorKind::NetworkOrServer => fallback.to_string(),
    }
}

/// Markers of a 403 caused by the credentials rather than by the action
const AUTHENTICATION_MARKERS: [&str; 6] = [
    "authentication",
    "unauthenticated",
    "not authenticated",
    "token",
    "log in",
    "login",
];

/// Whether a 403 was caused by a broken session rather than a refused action
///
/// Role and ownership refusals come back as a bare 403 or with a message about
/// access; only a message naming the credentials themselves counts.
pub fn forbidden_by_authentication(error: &ClientError) -> bool {
    if error.kind() != ErrorKind::Forbidden {
        return false;
    }

    let message = error
        .payload_message()
        .or_else(|| error.body().map(str::to_string))
        .unwrap_or_default()
        .to_lowercase();

    AUTHENTICATION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
