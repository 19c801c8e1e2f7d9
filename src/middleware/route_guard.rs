//! Page navigation guard.
//!
//! Decides, before a page renders, whether the visitor may see it. The
//! decision uses only the access cookie: an absent, undecodable or expired
//! token means anonymous. The guard never refreshes; that is left to the
//! client pipeline once the page is up.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

use crate::identity::jwt::{self, Claims};
use crate::policy::{self, PageAccess, RouteTable};
use crate::session::cookie::{ACCESS_TOKEN_COOKIE, read_cookie};

/// Paths the guard never inspects: API traffic, health, static assets.
const SKIPPED_PREFIXES: &[&str] = &["/api", "/health", "/_next/static", "/_next/image", "/static"];
const SKIPPED_PATHS: &[&str] = &["/favicon.ico", "/robots.txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Pure navigation decision.
///
/// `target` is the path plus query used for the login callback.
pub fn decide(
    routes: &RouteTable,
    path: &str,
    target: &str,
    access_token: Option<&str>,
    now_secs: u64,
) -> GuardDecision {
    let user: Option<Claims> = access_token.and_then(|t| jwt::authenticated_claims(t, now_secs));

    match (routes.classify_page(path), user) {
        (PageAccess::Protected | PageAccess::RoleRestricted(_), None) => {
            GuardDecision::Redirect(policy::login_redirect(target))
        }
        (PageAccess::RoleRestricted(required), Some(claims)) if claims.role != required => {
            GuardDecision::Redirect(policy::HOME_PATH.into())
        }
        (PageAccess::AnonymousOnly, Some(claims)) => {
            GuardDecision::Redirect(policy::landing_path(claims.role).into())
        }
        _ => GuardDecision::Allow,
    }
}

fn is_skipped(path: &str) -> bool {
    SKIPPED_PATHS.contains(&path)
        || SKIPPED_PREFIXES
            .iter()
            .any(|p| path == *p || path.starts_with(&format!("{p}/")))
}

/// Axum middleware applying `decide` to page navigations.
pub async fn route_guard(
    State(state): State<Arc<crate::AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if is_skipped(&path) {
        return next.run(req).await;
    }

    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let access_token = read_cookie(req.headers(), ACCESS_TOKEN_COOKIE);

    match decide(
        &state.routes,
        &path,
        &target,
        access_token.as_deref(),
        jwt::now_secs(),
    ) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::Redirect(location) => {
            tracing::debug!(path = %path, location = %location, "navigation redirected");
            Redirect::temporary(&location).into_response()
        }
    }
}
