//! Donation platform BFF: auth endpoints, credential cookies, upstream proxy
//! and page guard in front of the gateway, plus the client pipeline that
//! talks to it.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod middleware;
pub mod ocsf;
pub mod policy;
pub mod routes;
pub mod session;
pub mod types;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::route_guard::route_guard;
use crate::policy::RouteTable;
use crate::session::cookie::CookiePolicy;
use crate::session::middleware::credential_middleware;

/// Shared application state available to all route handlers.
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub routes: RouteTable,
    pub cookie_policy: Arc<CookiePolicy>,
}

impl AppState {
    /// Build state with one upstream client carrying the configured timeout.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            routes: RouteTable::new(config.public_endpoints.clone()),
            cookie_policy: Arc::new(CookiePolicy::from_config(&config)),
            http_client,
            config,
        })
    }
}

/// Build the Axum router with all middleware and routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cookie_policy = state.cookie_policy.clone();

    // CORS: allow single frontend origin with credentials
    let origin = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(error = %e, url = %state.config.frontend_url, "invalid FRONTEND_URL; CORS disabled");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/login", post(routes::login::login))
        .route("/logout", post(routes::logout::logout))
        .route("/refresh", post(routes::refresh::refresh_tokens))
        .route("/register", post(routes::register::register));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api/auth", auth_routes)
        .route(
            "/api/{*path}",
            get(routes::proxy::forward)
                .post(routes::proxy::forward)
                .put(routes::proxy::forward)
                .patch(routes::proxy::forward)
                .delete(routes::proxy::forward),
        )
        .fallback(routes::page::bootstrap)
        .layer(from_fn_with_state(state.clone(), route_guard))
        .layer(from_fn(move |req, next| {
            let policy = cookie_policy.clone();
            credential_middleware(policy, req, next)
        }))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
