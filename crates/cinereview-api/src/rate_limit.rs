//! Fixed-window request limiting keyed by client address.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use cinereview_core::clock::SharedClock;
use dashmap::DashMap;
use tracing::warn;

use crate::error::ErrorBody;
use crate::state::AppState;

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    ends_at: DateTime<Utc>,
}

/// Counts requests per key in fixed windows. Each key's window starts with
/// its first request and resets once it has elapsed.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clock: SharedClock,
    windows: DashMap<String, Window>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("tracked_keys", &self.windows.len())
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Allows `limit` requests per key in each `window`.
    #[must_use]
    pub fn new(limit: u32, window: Duration, clock: SharedClock) -> Self {
        Self {
            limit,
            window,
            clock,
            windows: DashMap::new(),
        }
    }

    /// Allows `limit` requests per key per minute.
    #[must_use]
    pub fn per_minute(limit: u32, clock: SharedClock) -> Self {
        Self::new(limit, Duration::minutes(1), clock)
    }

    /// Records one request for `key`.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now();
        let mut window = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            ends_at: now + self.window,
        });
        if now >= window.ends_at {
            window.count = 0;
            window.ends_at = now + self.window;
        }
        window.count = window.count.saturating_add(1);

        if window.count > self.limit {
            RateDecision::Limited
        } else {
            RateDecision::Allowed
        }
    }

    /// Drops windows that have already elapsed.
    pub fn prune(&self) {
        let now = self.clock.now();
        self.windows.retain(|_, window| window.ends_at > now);
    }
}

/// First `X-Forwarded-For` hop, else `X-Real-IP`, else `unknown`.
#[must_use]
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip).unwrap_or("unknown").to_owned()
}

/// Extractor that charges one request against the auth rate limiter and
/// rejects with 429 once the client is over its budget.
#[derive(Debug, Clone, Copy)]
pub struct AuthRateLimit;

impl FromRequestParts<AppState> for AuthRateLimit {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = client_key(&parts.headers);
        match state.auth_rate_limiter.check(&key) {
            RateDecision::Allowed => Ok(Self),
            RateDecision::Limited => {
                warn!(client = %key, "auth rate limit exceeded");
                Err(ErrorBody::response(
                    StatusCode::TOO_MANY_REQUESTS,
                    "rate_limited",
                    "rate limit exceeded",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderValue;
    use chrono::TimeZone;
    use cinereview_test_support::FixedClock;

    use super::*;

    fn limiter(limit: u32) -> (RateLimiter, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        ));
        (RateLimiter::per_minute(limit, clock.clone()), clock)
    }

    #[test]
    fn test_requests_over_the_limit_are_limited() {
        let (limiter, _) = limiter(2);

        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Allowed);
        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Allowed);
        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Limited);
    }

    #[test]
    fn test_keys_are_counted_independently() {
        let (limiter, _) = limiter(1);

        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Allowed);
        assert_eq!(limiter.check("10.0.0.2"), RateDecision::Allowed);
        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Limited);
    }

    #[test]
    fn test_window_resets_after_it_elapses() {
        // Arrange
        let (limiter, clock) = limiter(1);
        limiter.check("10.0.0.1");
        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Limited);

        // Act
        clock.advance(Duration::seconds(61));

        // Assert
        assert_eq!(limiter.check("10.0.0.1"), RateDecision::Allowed);
    }

    #[test]
    fn test_prune_forgets_elapsed_windows() {
        let (limiter, clock) = limiter(5);
        limiter.check("10.0.0.1");
        clock.advance(Duration::minutes(2));
        limiter.check("10.0.0.2");

        limiter.prune();

        assert_eq!(limiter.windows.len(), 1);
        assert!(limiter.windows.contains_key("10.0.0.2"));
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.7"));
        assert_eq!(client_key(&headers), "192.0.2.7");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.9");
    }
}
