//! Local server entrypoint.
//!
//! - Production (`APP_ENV`/`NODE_ENV` = `production`): JSON logs
//! - Otherwise: `.env` is loaded and logs are human-readable

use std::env;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use donation_bff::config::Config;
use donation_bff::{AppState, create_app};

#[tokio::main]
async fn main() {
    let production = env::var("APP_ENV")
        .or_else(|_| env::var("NODE_ENV"))
        .is_ok_and(|v| v.eq_ignore_ascii_case("production"));

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if production {
        fmt().json().with_env_filter(filter()).init();
    } else {
        // Load .env for local dev
        let _ = dotenvy::dotenv();
        fmt().with_env_filter(filter()).init();
    }

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        backend = %config.backend_url,
        production = config.production,
        public_endpoints = config.public_endpoints.len(),
        "configuration loaded"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config).expect("Failed to build upstream HTTP client"));
    let app = create_app(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
