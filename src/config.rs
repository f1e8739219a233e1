use std::{env, time::Duration};

use crate::rate_limit::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub run_migrations: bool,
    pub concurrency_limit: usize,
    pub body_limit_bytes: usize,
    /// Requests each client may make per window.
    pub rate_limit_max: u32,
    pub rate_limit_window_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let run_migrations = parse_or("APP_RUN_MIGRATIONS", true);
        let concurrency_limit = parse_or("APP_CONCURRENCY_LIMIT", 100);
        let body_limit_bytes = parse_or("APP_BODY_LIMIT_BYTES", 1024 * 1024);
        let rate_limit_max = parse_or("RATE_LIMIT_MAX", 100);
        let rate_limit_window_ms = parse_or("RATE_LIMIT_WINDOW", 15 * 60 * 1000);
        Ok(Self {
            port,
            database_url,
            host,
            run_migrations,
            concurrency_limit,
            body_limit_bytes,
            rate_limit_max,
            rate_limit_window_ms,
        })
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max,
            window: Duration::from_millis(self.rate_limit_window_ms.max(1)),
        }
    }
}

/// Reads `key` and parses it, keeping `default` when unset or malformed.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_window_is_in_milliseconds() {
        let config = AppConfig {
            database_url: "postgres://localhost/catalog".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            run_migrations: false,
            concurrency_limit: 100,
            body_limit_bytes: 1024,
            rate_limit_max: 100,
            rate_limit_window_ms: 15 * 60 * 1000,
        };
        let limit = config.rate_limit();
        assert_eq!(limit.max_requests, 100);
        assert_eq!(limit.window, Duration::from_secs(900));
    }
}
