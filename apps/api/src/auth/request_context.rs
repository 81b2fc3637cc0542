use axum::http::HeaderMap;
use axum::http::header::HOST;

/// Key used when a request carries no usable client identity.
pub(super) const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Longest key kept per client; fits an IPv6 address or a host name with port.
pub(super) const MAX_CLIENT_KEY_LENGTH: usize = 128;

/// Derives the rate-limit key for a request.
///
/// Prefers the first `X-Forwarded-For` hop, then the `Host` header. Both are
/// client-controlled, so the key only groups honest clients; the backend
/// must enforce its own limits. Keys are truncated to
/// [`MAX_CLIENT_KEY_LENGTH`] so sprayed headers cannot grow the limiter
/// store without bound.
pub(super) fn client_key(headers: &HeaderMap) -> String {
    first_header_value(headers, "x-forwarded-for", |value| value.split(',').next())
        .or_else(|| first_header_value(headers, HOST.as_str(), Some))
        .unwrap_or_else(|| UNKNOWN_CLIENT_KEY.to_owned())
}

fn first_header_value<'a>(
    headers: &'a HeaderMap,
    name: &str,
    select: impl FnOnce(&'a str) -> Option<&'a str>,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(select)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.chars().take(MAX_CLIENT_KEY_LENGTH).collect())
}
