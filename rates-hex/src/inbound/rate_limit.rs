//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a keyed token bucket. A client is
//! the peer address of the connection. `X-Forwarded-For` is honoured only when
//! the peer is one of the configured trusted proxies.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    DefaultKeyedRateLimiter, Quota, RateLimiter,
    clock::{Clock, DefaultClock},
};
use serde_json::json;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// Key shared by requests whose peer address is unknown.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    trusted_proxies: Vec<IpAddr>,
    clock: DefaultClock,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state.
    ///
    /// # Arguments
    /// * `requests` - Number of requests allowed per period (zero is treated as one)
    /// * `period` - Time period for the quota (zero falls back to one minute)
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let period = if period.is_zero() {
            Duration::from_secs(60)
        } else {
            period
        };
        // Replenish the whole burst once per period.
        let quota = match Quota::with_period(period / burst.get()) {
            Some(quota) => quota.allow_burst(burst),
            None => Quota::per_minute(burst),
        };

        Self {
            limiter: RateLimiter::keyed(quota),
            trusted_proxies: Vec::new(),
            clock: DefaultClock::default(),
        }
    }

    /// Peers whose `X-Forwarded-For` header names the real client.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies;
        self
    }

    /// Takes one cell from `client`'s bucket.
    ///
    /// On rejection returns how long until the next request would pass.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Drops buckets that have refilled completely.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Resolves the client a request is accounted to.
    ///
    /// The rightmost forwarded entry that is not itself a trusted proxy wins,
    /// since everything left of it is client-controlled.
    fn client_of(&self, peer: Option<IpAddr>, forwarded_for: Option<&str>) -> IpAddr {
        let Some(peer) = peer else {
            return UNKNOWN_CLIENT;
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer;
        }

        forwarded_for
            .into_iter()
            .flat_map(|h| h.rsplit(','))
            .filter_map(|entry| entry.trim().parse::<IpAddr>().ok())
            .find(|ip| !self.trusted_proxies.contains(ip))
            .unwrap_or(peer)
    }
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let forwarded_for = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok());
    let client = limiter.client_of(peer, forwarded_for);

    if let Err(wait) = limiter.check(client) {
        let retry_after = wait.as_secs_f64().ceil().max(1.0) as u64;
        tracing::warn!(%client, retry_after, "rate limit exceeded");

        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": StatusCode::TOO_MANY_REQUESTS.as_u16(),
                "retry_after_seconds": retry_after
            })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn test_burst_then_rejects() {
        let limiter = RateLimiterState::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(limiter.check(ip("10.0.0.1")).is_ok());
        }
        assert!(limiter.check(ip("10.0.0.1")).is_err());
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiterState::new(1, Duration::from_secs(60));

        assert!(limiter.check(ip("10.0.0.1")).is_ok());
        assert!(limiter.check(ip("10.0.0.1")).is_err());
        assert!(limiter.check(ip("10.0.0.2")).is_ok());
    }

    #[test]
    fn test_zero_requests_still_allows_one() {
        let limiter = RateLimiterState::new(0, Duration::from_secs(60));

        assert!(limiter.check(ip("10.0.0.1")).is_ok());
        assert!(limiter.check(ip("10.0.0.1")).is_err());
    }

    #[test]
    fn test_wait_reflects_replenish_interval() {
        // 3 per minute refills one cell every 20 seconds.
        let limiter = RateLimiterState::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            limiter.check(ip("10.0.0.1")).unwrap();
        }

        let wait = limiter.check(ip("10.0.0.1")).unwrap_err();
        assert!(wait <= Duration::from_secs(20), "waited {wait:?}");
        assert!(wait > Duration::from_secs(19), "waited {wait:?}");
    }

    #[test]
    fn test_forwarded_for_ignored_from_untrusted_peer() {
        let limiter = RateLimiterState::new(1, Duration::from_secs(60));
        let peer = ip("203.0.113.7");

        assert_eq!(limiter.client_of(Some(peer), Some("10.9.9.9")), peer);
        assert_eq!(limiter.client_of(None, Some("10.9.9.9")), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_forwarded_for_from_trusted_proxy() {
        let proxy = ip("10.0.0.254");
        let limiter = RateLimiterState::new(1, Duration::from_secs(60))
            .with_trusted_proxies(vec![proxy, ip("10.0.0.253")]);

        // Left entries are client-controlled; the last untrusted hop counts.
        assert_eq!(
            limiter.client_of(Some(proxy), Some("1.1.1.1, 198.51.100.4, 10.0.0.253")),
            ip("198.51.100.4")
        );
        assert_eq!(limiter.client_of(Some(proxy), Some("garbage")), proxy);
        assert_eq!(limiter.client_of(Some(proxy), None), proxy);
    }

    #[test]
    fn test_sweep_drops_refilled_buckets() {
        let limiter = RateLimiterState::new(1, Duration::from_millis(5));
        for i in 0..50u8 {
            limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, i))).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), 50);

        std::thread::sleep(Duration::from_millis(50));
        limiter.sweep();

        assert_eq!(limiter.tracked_clients(), 0);
    }
}
