use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderName, HeaderValue};

/// Permissive cross-origin headers carried on every endpoint response.
///
/// The allow-list matches what browser clients of the hosted backend send:
/// the session bearer, client info, the public API key, and content type.
pub(super) fn cors_headers() -> [(HeaderName, HeaderValue); 2] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("authorization, x-client-info, apikey, content-type"),
        ),
    ]
}
