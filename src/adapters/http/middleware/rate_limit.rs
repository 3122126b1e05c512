//! Per-IP rate limiting for login-link requests.
//!
//! Denied requests get `429 Too Many Requests` with `Retry-After`. A failing
//! limiter lets the request through.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::ports::{RateLimitKey, RateLimitResult, RateLimiter};

/// Rate limiter middleware state.
pub type RateLimiterState = Arc<dyn RateLimiter>;

pub async fn login_link_rate_limit(
    State(limiter): State<RateLimiterState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers());

    match limiter.check(RateLimitKey::login_link(&ip)).await {
        Ok(RateLimitResult::Allowed(_)) => next.run(request).await,
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::warn!(ip = %ip, retry_after = denied.retry_after_secs, "Login link rate limit hit");
            rate_limit_response(denied.retry_after_secs)
        }
        Err(e) => {
            tracing::warn!("Rate limiter unavailable: {}", e);
            next.run(request).await
        }
    }
}

/// Client address as reported by the proxy chain.
///
/// First `X-Forwarded-For` hop, then `X-Real-IP`, then `unknown`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}

fn rate_limit_response(retry_after_secs: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new(
            "RATE_LIMIT_EXCEEDED",
            "Too many requests. Try again later.",
        )),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn first_forwarded_hop_wins() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        assert_eq!(client_ip(&headers(&[("x-real-ip", "198.51.100.4")])), "198.51.100.4");
        assert_eq!(client_ip(&headers(&[("x-forwarded-for", " ")])), "unknown");
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn denial_sets_retry_after() {
        let response = rate_limit_response(890);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "890");
    }
}
