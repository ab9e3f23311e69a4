//! Caller identification and rate limit response helpers for axum.
//!
//! Quota checks run inside the application handlers (generation and
//! validation each have their own limiter). This module supplies what those
//! handlers need from HTTP: who the caller is, and how a quota decision is
//! rendered back to the client.
//!
//! Rate limit status is returned in standard HTTP headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Unix timestamp when the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthenticatedUser, ClientIdentity};
use crate::ports::{RateLimitDenied, RateLimitStatus};

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    /// Maximum requests allowed in the window.
    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    /// Requests remaining in the current window.
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    /// Unix timestamp when the window resets.
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Extract client IP from request headers, falling back to the socket address.
///
/// Order of precedence:
/// 1. X-Forwarded-For header (first IP in list)
/// 2. X-Real-IP header
/// 3. CF-Connecting-IP header
/// 4. ConnectInfo socket address
pub fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    // Take the first IP (client IP, before any proxies)
    if let Some(first_ip) = header("X-Forwarded-For")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(first_ip.to_string());
    }

    if let Some(real_ip) = header("X-Real-IP") {
        return Some(real_ip.to_string());
    }

    if let Some(cf_ip) = header("CF-Connecting-IP") {
        return Some(cf_ip.to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

/// Extractor resolving the caller's quota identity.
///
/// Authenticated users (placed in extensions by the auth middleware) are
/// keyed by account; everyone else by client address.
#[derive(Debug, Clone)]
pub struct Caller(pub ClientIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthenticatedUser>();
        let connect_info = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        let ip = extract_client_ip(&parts.headers, connect_info);
        Ok(Caller(ClientIdentity::resolve(user, ip.as_deref())))
    }
}

/// Add rate limit headers for an allowed request.
pub fn add_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(
        headers::X_RATELIMIT_LIMIT.clone(),
        HeaderValue::from(status.limit),
    );
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(status.remaining),
    );
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(status.reset_at.as_unix_secs()),
    );
}

/// Create a 429 Too Many Requests response.
pub fn rate_limit_response(denied: &RateLimitDenied) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(serde_json::json!({
            "error": "Rate limit exceeded",
            "code": "RATE_LIMIT_EXCEEDED",
            "message": denied.message,
            "retryAfter": denied.retry_after_secs,
            "resetTime": denied.reset_at.to_rfc3339(),
            "limit": denied.limit,
            "remaining": 0
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(
        headers::X_RATELIMIT_LIMIT.clone(),
        HeaderValue::from(denied.limit),
    );
    headers.insert(headers::X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(denied.reset_at.as_unix_secs()),
    );
    headers.insert("Retry-After", HeaderValue::from(denied.retry_after_secs));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::ports::RateLimitScope;
    use axum::http::Request;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in pairs {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().headers().clone()
    }

    fn socket() -> ConnectInfo<SocketAddr> {
        ConnectInfo("10.0.0.9:41000".parse().unwrap())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // IP Extraction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn extract_ip_from_x_forwarded_for() {
        let ip = extract_client_ip(&headers(&[("X-Forwarded-For", "1.2.3.4, 5.6.7.8")]), None);
        assert_eq!(ip, Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_ip_from_x_real_ip() {
        let ip = extract_client_ip(&headers(&[("X-Real-IP", "9.8.7.6")]), None);
        assert_eq!(ip, Some("9.8.7.6".to_string()));
    }

    #[test]
    fn extract_ip_from_cf_connecting_ip() {
        let ip = extract_client_ip(&headers(&[("CF-Connecting-IP", "4.4.4.4")]), Some(&socket()));
        assert_eq!(ip, Some("4.4.4.4".to_string()));
    }

    #[test]
    fn extract_ip_prefers_x_forwarded_for() {
        let ip = extract_client_ip(
            &headers(&[
                ("X-Forwarded-For", "1.2.3.4"),
                ("X-Real-IP", "5.6.7.8"),
                ("CF-Connecting-IP", "4.4.4.4"),
            ]),
            None,
        );
        assert_eq!(ip, Some("1.2.3.4".to_string()));
    }

    #[test]
    fn blank_forwarded_header_falls_through() {
        let ip = extract_client_ip(
            &headers(&[("X-Forwarded-For", " "), ("X-Real-IP", "5.6.7.8")]),
            None,
        );
        assert_eq!(ip, Some("5.6.7.8".to_string()));
    }

    #[test]
    fn extract_ip_falls_back_to_socket() {
        let ip = extract_client_ip(&HeaderMap::new(), Some(&socket()));
        assert_eq!(ip, Some("10.0.0.9".to_string()));
    }

    #[test]
    fn extract_ip_returns_none_without_anything() {
        assert_eq!(extract_client_ip(&HeaderMap::new(), None), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Caller Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn caller_is_user_when_authenticated() {
        let mut request = Request::builder()
            .uri("/test")
            .header("X-Forwarded-For", "1.2.3.4")
            .body(())
            .unwrap();
        request.extensions_mut().insert(AuthenticatedUser::new(
            UserId::new("cook-7").unwrap(),
            None,
        ));
        let (mut parts, _) = request.into_parts();

        let Caller(identity) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.to_string(), "user:cook-7");
    }

    #[tokio::test]
    async fn caller_without_address_is_unknown_guest() {
        let (mut parts, _) = Request::builder().uri("/test").body(()).unwrap().into_parts();

        let Caller(identity) = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity, ClientIdentity::guest("unknown"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Response Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn rejection_renders_429_with_retry_after() {
        let denied = RateLimitDenied {
            limit: 5,
            retry_after_secs: 42,
            reset_at: Timestamp::from_unix_secs(1_700_000_000),
            scope: RateLimitScope::Ip,
            message: "Too many recipes".to_string(),
        };

        let response = rate_limit_response(&denied);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "42");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-reset"], "1700000000");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(body["retryAfter"], 42);
        assert_eq!(body["limit"], 5);
        assert_eq!(body["remaining"], 0);
    }

    #[test]
    fn status_headers_are_added() {
        let mut map = HeaderMap::new();
        add_rate_limit_headers(
            &mut map,
            &RateLimitStatus {
                limit: 20,
                remaining: 19,
                reset_at: Timestamp::from_unix_secs(1_700_003_600),
                window_secs: 3600,
            },
        );

        assert_eq!(map["x-ratelimit-limit"], "20");
        assert_eq!(map["x-ratelimit-remaining"], "19");
        assert_eq!(map["x-ratelimit-reset"], "1700003600");
    }
}
