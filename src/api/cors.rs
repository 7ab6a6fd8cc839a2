//! Cross-origin policy for browser clients.
//!
//! Origins are matched against configured patterns. A pattern ending in
//! `:*` accepts its scheme and host on any numeric port.

use axum::http::{HeaderValue, Method, header, request::Parts};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Returns true if `origin` is allowed by `pattern`.
#[must_use]
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix(":*") {
        Some(prefix) => origin
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(':'))
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|byte| byte.is_ascii_digit())),
        None => pattern == origin,
    }
}

/// Builds the CORS layer for the given origin patterns.
///
/// Credentials are allowed, so origins are always echoed back rather than
/// answered with a wildcard.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns = allowed_origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|origin| {
                    patterns
                        .iter()
                        .any(|pattern| origin_matches(pattern, origin))
                })
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:*", "http://localhost:3000", true)]
    #[case("http://localhost:*", "http://localhost:5173", true)]
    #[case("http://127.0.0.1:*", "http://127.0.0.1:8080", true)]
    #[case("http://localhost:*", "http://localhost", false)]
    #[case("http://localhost:*", "http://localhost:", false)]
    #[case("http://localhost:*", "http://localhost:80abc", false)]
    #[case("http://localhost:*", "http://localhost.evil.com:80", false)]
    #[case("http://localhost:*", "https://localhost:3000", false)]
    #[case("https://bugs.example.com", "https://bugs.example.com", true)]
    #[case("https://bugs.example.com", "https://bugs.example.com:8443", false)]
    fn test_origin_matches(#[case] pattern: &str, #[case] origin: &str, #[case] expected: bool) {
        assert_eq!(origin_matches(pattern, origin), expected);
    }
}
