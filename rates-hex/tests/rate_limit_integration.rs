//! Per-client quotas enforced by the router's limiter layer.
//!
//! Requests carry a `ConnectInfo` peer address the way
//! `into_make_service_with_connect_info` attaches it in production.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header::RETRY_AFTER},
};
use http_body_util::BodyExt;
use rates_hex::{
    RateService,
    inbound::{HttpServer, RateLimiterState},
};
use rates_repo::SqliteRepo;
use serde_json::Value;
use tower::ServiceExt;

const PROXY: &str = "10.0.0.254";

async fn limited_app(limiter: RateLimiterState) -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    HttpServer::with_limiter(RateService::new(repo), limiter).router()
}

fn per_minute(requests: u32) -> RateLimiterState {
    RateLimiterState::new(requests, Duration::from_secs(60))
}

/// `GET uri` from `peer`, optionally claiming a forwarded client.
fn from_peer(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let peer: IpAddr = peer.parse().unwrap();
    let mut builder = Request::builder()
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::new(peer, 40_000)));
    if let Some(client) = forwarded_for {
        builder = builder.header("X-Forwarded-For", client);
    }
    builder.body(Body::empty()).unwrap()
}

async fn status_of(app: &Router, request: Request<Body>) -> StatusCode {
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_quota_exhaustion_returns_429_with_wait() {
    let app = limited_app(per_minute(3)).await;

    for _ in 0..3 {
        let request = from_peer("/api/rates/availableDates", "203.0.113.1", None);
        assert_eq!(status_of(&app, request).await, StatusCode::OK);
    }

    let request = from_peer("/api/rates/availableDates", "203.0.113.1", None);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(
        response.headers()[RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse::<u64>()
            .is_ok()
    );
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .contains("application/json")
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
    assert_eq!(body["code"], 429);

    // Three per minute refill one slot every twenty seconds.
    let wait = body["retry_after_seconds"].as_u64().unwrap();
    assert!((1..=20).contains(&wait), "retry after {wait}s");
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_refill_quota() {
    let app = limited_app(per_minute(1)).await;

    let first = from_peer("/api/currencies", "203.0.113.9", Some("198.51.100.0"));
    assert_eq!(status_of(&app, first).await, StatusCode::OK);

    for i in 1..=20 {
        let spoofed = format!("198.51.100.{i}");
        let request = from_peer("/api/currencies", "203.0.113.9", Some(&spoofed));
        assert_eq!(
            status_of(&app, request).await,
            StatusCode::TOO_MANY_REQUESTS,
            "forwarded-for {spoofed} from the same peer got a fresh quota"
        );
    }
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_identity() {
    let proxy: IpAddr = PROXY.parse().unwrap();
    let app = limited_app(per_minute(1).with_trusted_proxies(vec![proxy])).await;

    let alice = || from_peer("/api/currencies", PROXY, Some("198.51.100.1"));
    let bob = || from_peer("/api/currencies", PROXY, Some("198.51.100.2"));

    assert_eq!(status_of(&app, alice()).await, StatusCode::OK);
    assert_eq!(status_of(&app, alice()).await, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(status_of(&app, bob()).await, StatusCode::OK);
}

#[tokio::test]
async fn test_distinct_peers_have_separate_quotas() {
    let app = limited_app(per_minute(1)).await;

    assert_eq!(
        status_of(&app, from_peer("/api/currencies", "203.0.113.1", None)).await,
        StatusCode::OK
    );
    assert_eq!(
        status_of(&app, from_peer("/api/currencies", "203.0.113.1", None)).await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        status_of(&app, from_peer("/api/currencies", "203.0.113.2", None)).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_health_is_never_limited() {
    let app = limited_app(per_minute(1)).await;

    for _ in 0..10 {
        let request = from_peer("/health", "203.0.113.1", None);
        assert_eq!(status_of(&app, request).await, StatusCode::OK);
    }
}
