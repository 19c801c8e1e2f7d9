//! Application configuration via environment variables.
//!
//! Defaults match the frontend's Next.js BFF so an unconfigured local run
//! points at a gateway on `localhost:8080`.

use std::env;
use std::time::Duration;

use crate::policy::DEFAULT_PUBLIC_ENDPOINTS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream gateway base URL, without a trailing slash.
    pub backend_url: String,
    /// True when `NODE_ENV` / `APP_ENV` is `production`. Drives the cookie `Secure` flag.
    pub production: bool,
    pub frontend_url: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub access_token_max_age: u64,
    pub refresh_token_max_age: u64,
    /// Request body cap for proxied uploads.
    pub max_body_bytes: usize,
    /// Backend path prefixes reachable without a credential.
    pub public_endpoints: Vec<String>,
}

/// Upstream file uploads are capped at 10 MB; leave room for multipart framing.
const DEFAULT_MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is strictly required; every variable has a local-dev default.
    /// Malformed numeric values are reported rather than silently replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "development".into());

        let public_endpoints = match env::var("PUBLIC_ENDPOINTS") {
            Ok(raw) => parse_list(&raw),
            Err(_) => default_public_endpoints(),
        };

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            production: environment.eq_ignore_ascii_case("production"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            port: parsed_env("PORT", 3000)?,
            upstream_timeout: Duration::from_secs(parsed_env("UPSTREAM_TIMEOUT_SECS", 30)?),
            access_token_max_age: parsed_env("ACCESS_TOKEN_MAX_AGE", 60 * 60)?,
            refresh_token_max_age: parsed_env("REFRESH_TOKEN_MAX_AGE", 60 * 60 * 24 * 7)?,
            max_body_bytes: parsed_env("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            public_endpoints,
        })
    }

    /// Absolute upstream URL for a gateway path such as `/identity/auth/token`.
    pub fn gateway_url(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }
}

/// Configuration for testing; all fields settable directly.
impl Config {
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://localhost:8080".into(),
            production: false,
            frontend_url: "http://localhost:3000".into(),
            port: 3000,
            upstream_timeout: Duration::from_secs(5),
            access_token_max_age: 3600,
            refresh_token_max_age: 604_800,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            public_endpoints: default_public_endpoints(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

fn default_public_endpoints() -> Vec<String> {
    DEFAULT_PUBLIC_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", s.trim_start_matches('/')))
        .collect()
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.into(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
