//! Fixed-window request limiter keyed by client address.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};

use crate::error::{AppError, AppResult};

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug)]
struct Window {
    hits: u32,
    started: Instant,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            hits: 0,
            started: now,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `key`; returns how many remain in the current window.
    pub async fn check(&self, key: &str) -> AppResult<u32> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now));

        if now.duration_since(window.started) >= self.config.window {
            *window = Window::new(now);
        }

        if window.hits >= self.config.max_requests {
            let reset = self
                .config
                .window
                .saturating_sub(now.duration_since(window.started));
            let retry_after = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
            return Err(AppError::RateLimited { retry_after });
        }

        window.hits += 1;
        Ok(self.config.max_requests - window.hits)
    }

    /// Drops windows that have already expired.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, w| now.duration_since(w.started) < self.config.window);
    }

    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Rejects a client once it exceeds its quota with `429` and the error envelope.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    let remaining = limiter.check(&key).await.inspect_err(|_| {
        tracing::warn!(client = %key, "rate limit exceeded");
    })?;

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        RATELIMIT_LIMIT,
        HeaderValue::from(limiter.config.max_requests),
    );
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
    Ok(response)
}

/// Periodically drops expired windows.
pub async fn cleanup_rate_limits(limiter: RateLimiter) {
    loop {
        sleep(limiter.config.window).await;
        limiter.cleanup().await;
        let clients = limiter.tracked().await;
        tracing::debug!(clients, "rate limit windows pruned");
    }
}

fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http};

    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn quota_is_per_client_and_resets_with_window() {
        let limiter = limiter(2);
        assert_eq!(limiter.check("10.0.0.1").await.unwrap(), 1);
        assert_eq!(limiter.check("10.0.0.1").await.unwrap(), 0);

        let err = limiter.check("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { retry_after: 60 }));
        assert_eq!(limiter.check("10.0.0.2").await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(20)).await;
        let err = limiter.check("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { retry_after: 40 }));

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(limiter.check("10.0.0.1").await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_expired_windows() {
        let limiter = limiter(5);
        limiter.check("a").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.check("b").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, 1);
    }

    #[test]
    fn client_key_prefers_first_forwarded_address() {
        let request = http::Request::builder()
            .header(FORWARDED_FOR, "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.7");

        let request = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&request), "unknown");
    }
}
