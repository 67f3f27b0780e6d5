use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use promptory_webhook::{RequestEncoding, WebhookConfig};

/// Server configuration loaded from environment variables.
///
/// Everything except the webhook URL has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Must cover a full webhook round-trip.
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup, in seconds.
    pub shutdown_timeout_secs: u64,
    /// Sessions not touched for this many seconds are torn down.
    pub session_idle_ttl_secs: u64,
    /// How often idle sessions are swept, in seconds.
    pub session_sweep_interval_secs: u64,
    /// Largest accepted request body (product image uploads).
    pub max_upload_bytes: usize,
    /// Image-generation webhook settings.
    pub webhook: WebhookConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:8080` |
    /// | `REQUEST_TIMEOUT_SECS`       | `150`                   |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                    |
    /// | `SESSION_IDLE_TTL_SECS`      | `1800`                  |
    /// | `SESSION_SWEEP_INTERVAL_SECS`| `60`                    |
    /// | `MAX_UPLOAD_BYTES`           | `10485760`              |
    /// | `TRYON_WEBHOOK_URL`          | required                |
    /// | `TRYON_WEBHOOK_ENCODING`     | `multipart`             |
    /// | `TRYON_WEBHOOK_TIMEOUT_SECS` | `120`                   |
    /// | `TRYON_WEBHOOK_MAX_RESPONSE_BYTES` | `33554432`        |
    ///
    /// Panics on missing or malformed values so misconfiguration fails at
    /// startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8080".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "150");
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30");
        let session_idle_ttl_secs: u64 = env_or("SESSION_IDLE_TTL_SECS", "1800");
        let session_sweep_interval_secs: u64 = env_or("SESSION_SWEEP_INTERVAL_SECS", "60");
        assert!(
            session_sweep_interval_secs > 0,
            "SESSION_SWEEP_INTERVAL_SECS must be positive"
        );
        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", "10485760");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            session_idle_ttl_secs,
            session_sweep_interval_secs,
            max_upload_bytes,
            webhook: webhook_from_env(),
        }
    }
}

fn webhook_from_env() -> WebhookConfig {
    let url = std::env::var("TRYON_WEBHOOK_URL").expect("TRYON_WEBHOOK_URL must be set");
    let encoding: RequestEncoding = env_or("TRYON_WEBHOOK_ENCODING", "multipart");
    let timeout_secs: u64 = env_or("TRYON_WEBHOOK_TIMEOUT_SECS", "120");
    let max_response_bytes: usize = env_or("TRYON_WEBHOOK_MAX_RESPONSE_BYTES", "33554432");

    WebhookConfig::new(url)
        .with_encoding(encoding)
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_max_response_bytes(max_response_bytes)
}

fn env_or<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|e| panic!("{key} is invalid: {e}"))
}
