//! Axum credential middleware.
//!
//! Reads the credential cookies once per request, exposes them to handlers
//! through a `CredentialJar` in request extensions, and writes every
//! pending cookie mutation after the handler returns.
//!
//! - Handlers record `set` / `delete` calls on the jar
//! - Reads on the jar see the handler's own pending writes
//! - All `Set-Cookie` headers land on the same response, so the access and
//!   refresh cookies are never updated independently

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::cookie::{
    ACCESS_TOKEN_COOKIE, CookiePolicy, REFRESH_TOKEN_COOKIE, make_delete_cookie, make_set_cookie,
    read_cookie,
};
use crate::identity::jwt::{self, Claims};

/// The two credential cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Credential {
    Access,
    Refresh,
}

impl Credential {
    pub fn cookie_name(self) -> &'static str {
        match self {
            Credential::Access => ACCESS_TOKEN_COOKIE,
            Credential::Refresh => REFRESH_TOKEN_COOKIE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Set(String),
    Delete,
}

#[derive(Debug, Default)]
struct JarState {
    access: Option<String>,
    refresh: Option<String>,
    pending: BTreeMap<Credential, Pending>,
}

/// Request-scoped view of the credential cookies, inserted into request
/// extensions by `credential_middleware`.
#[derive(Clone)]
pub struct CredentialJar {
    state: Arc<Mutex<JarState>>,
}

/// Extract CredentialJar from request extensions (put there by the credential middleware).
impl<S> FromRequestParts<S> for CredentialJar
where
    S: Send + Sync,
{
    type Rejection = crate::error::AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CredentialJar>()
            .cloned()
            .ok_or(crate::error::AppError::Internal(
                "Credential middleware not configured".into(),
            ))
    }
}

impl CredentialJar {
    pub fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(JarState {
                access,
                refresh,
                pending: BTreeMap::new(),
            })),
        }
    }

    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        Self::new(
            read_cookie(headers, ACCESS_TOKEN_COOKIE),
            read_cookie(headers, REFRESH_TOKEN_COOKIE),
        )
    }

    pub async fn get(&self, credential: Credential) -> Option<String> {
        let state = self.state.lock().await;
        match credential {
            Credential::Access => state.access.clone(),
            Credential::Refresh => state.refresh.clone(),
        }
    }

    pub async fn set(&self, credential: Credential, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.state.lock().await;
        match credential {
            Credential::Access => state.access = Some(value.clone()),
            Credential::Refresh => state.refresh = Some(value.clone()),
        }
        state.pending.insert(credential, Pending::Set(value));
    }

    pub async fn delete(&self, credential: Credential) {
        let mut state = self.state.lock().await;
        match credential {
            Credential::Access => state.access = None,
            Credential::Refresh => state.refresh = None,
        }
        state.pending.insert(credential, Pending::Delete);
    }

    /// Delete both cookies.
    pub async fn clear(&self) {
        self.delete(Credential::Access).await;
        self.delete(Credential::Refresh).await;
    }

    /// Claims of the current access token, if it decodes and is unexpired.
    pub async fn identity(&self) -> Option<Claims> {
        let token = self.get(Credential::Access).await?;
        jwt::authenticated_claims(&token, jwt::now_secs())
    }

    /// Drain pending mutations as `Set-Cookie` header values.
    async fn take_set_cookies(&self, policy: &CookiePolicy) -> Vec<String> {
        let mut state = self.state.lock().await;
        std::mem::take(&mut state.pending)
            .into_iter()
            .map(|(credential, pending)| {
                let name = credential.cookie_name();
                match pending {
                    Pending::Set(value) => {
                        let max_age = match credential {
                            Credential::Access => policy.access_max_age,
                            Credential::Refresh => policy.refresh_max_age,
                        };
                        make_set_cookie(name, &value, max_age, policy.secure)
                    }
                    Pending::Delete => make_delete_cookie(name, policy.secure),
                }
            })
            .collect()
    }
}

/// Axum middleware function for credential cookie handling.
pub async fn credential_middleware(
    policy: Arc<CookiePolicy>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CredentialJar::from_headers(req.headers());
    req.extensions_mut().insert(jar.clone());

    let mut response = next.run(req).await;

    for cookie in jar.take_set_cookies(&policy).await {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "dropping unencodable Set-Cookie header"),
        }
    }

    response
}
