use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::RETRY_AFTER},
    middleware,
    routing::get,
};
use catalog_api::rate_limit::{RateLimitConfig, RateLimiter, enforce_rate_limit};
use serde_json::Value;
use tower::ServiceExt;

fn app(max_requests: u32) -> Router {
    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests,
        window: Duration::from_secs(900),
    });
    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .layer(middleware::from_fn_with_state(limiter, enforce_rate_limit))
}

fn from(client: &str) -> Request<Body> {
    Request::builder()
        .uri("/ping")
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn over_quota_client_gets_429_envelope() {
    let app = app(2);

    for remaining in ["1", "0"] {
        let response = app.clone().oneshot(from("198.51.100.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["ratelimit-limit"], "2");
        assert_eq!(response.headers()["ratelimit-remaining"], remaining);
    }

    let response = app.clone().oneshot(from("198.51.100.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(RETRY_AFTER));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["message"], "Too many requests, please try again later");
    assert_eq!(body["data"]["kind"], "RateLimited");

    let other = app.oneshot(from("198.51.100.2")).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}
