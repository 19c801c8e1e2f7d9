//! HTTP client for the BFF, standing in for the browser.
//!
//! Credentials travel as cookies held in the client's cookie store. A 401
//! from any call except login and refresh triggers one shared refresh and,
//! when the retry policy allows, a replay of the original call. A failed
//! refresh ends the session and sends the navigator to the login page.

use axum::body::Bytes;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::refresh::{RefreshGate, RefreshOutcome};
use super::session::SessionContext;
use crate::policy;
use crate::types::{LoginRequest, LoginResponse, PageBootstrap, SessionRecord};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const REFRESH_ENDPOINT: &str = "/api/auth/refresh";

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    /// Path of the current page, without query.
    fn current_path(&self) -> String;
    fn navigate(&self, location: &str);
}

/// Navigator that records locations instead of driving a browser.
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![start.into()]),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = history.last().map(String::as_str).unwrap_or(policy::HOME_PATH);
        current.split('?').next().unwrap_or(current).to_string()
    }

    fn navigate(&self, location: &str) {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(location.to_string());
    }
}

/// When a call that failed with 401 is replayed after a successful refresh.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Replays allowed per call; `0` disables replay.
    pub max_attempts: u32,
    pub idempotent_only: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            idempotent_only: true,
        }
    }
}

impl RetryPolicy {
    pub fn permits(&self, method: &Method) -> bool {
        self.max_attempts > 0 && (!self.idempotent_only || is_idempotent(method))
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

/// One call to the BFF. `path` is relative to the BFF origin, e.g. `/api/core/campaigns`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            content_type: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Request with a JSON body.
    pub fn json<T: Serialize + ?Sized>(
        method: Method,
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, ClientError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ClientError::Serialize(e.to_string()))?;
        Ok(Self::new(method, path).with_body("application/json", bytes))
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body.into());
        self
    }

    /// Calls whose 401 never triggers a refresh.
    fn is_auth_call(&self) -> bool {
        self.path.starts_with(REFRESH_ENDPOINT) || self.path.starts_with(LOGIN_ENDPOINT)
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Serialize(e.to_string()))
    }

    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status,
                message: message_of(&self.body).unwrap_or_default(),
            })
        }
    }
}

/// Outcome of a page navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoad {
    Rendered(SessionRecord),
    Redirected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh failed; `redirect` is where the navigator was sent, if anywhere.
    #[error("Session expired, login required")]
    LoginRequired { redirect: Option<String> },

    #[error("Request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    gate: RefreshGate,
    retry: RetryPolicy,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            gate: RefreshGate::new(),
            retry: RetryPolicy::default(),
            navigator,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Send a call, recovering once from an expired access token.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let observed = self.gate.generation();
        let response = self.execute(&request).await?;

        if response.status != StatusCode::UNAUTHORIZED || request.is_auth_call() {
            return Ok(response);
        }

        match self
            .gate
            .refresh_once(observed, || self.call_refresh())
            .await
        {
            RefreshOutcome::Refreshed => {
                if !self.retry.permits(&request.method) {
                    return Ok(response);
                }
                let mut response = response;
                for _ in 0..self.retry.max_attempts {
                    response = self.execute(&request).await?;
                    if response.status != StatusCode::UNAUTHORIZED {
                        break;
                    }
                }
                Ok(response)
            }
            RefreshOutcome::Failed(reason) => {
                tracing::info!(reason = %reason, path = %request.path, "session refresh failed");
                Err(self.end_session().await)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let response = self
            .send(ApiRequest::json(Method::POST, LOGIN_ENDPOINT, &body)?)
            .await?;
        if response.status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        let login: LoginResponse = response.error_for_status()?.json()?;
        self.gate.reset().await;
        self.session.set_user(login.user.clone()).await;
        Ok(login)
    }

    /// Log out; the local session is cleared even if the call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.send(ApiRequest::new(Method::POST, LOGOUT_ENDPOINT)).await;
        self.session.clear().await;
        result?.error_for_status().map(|_| ())
    }

    /// Refresh proactively, sharing any refresh already in flight.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let observed = self.gate.generation();
        match self.gate.refresh_once(observed, || self.call_refresh()).await {
            RefreshOutcome::Refreshed => Ok(()),
            RefreshOutcome::Failed(_) => Err(self.end_session().await),
        }
    }

    /// Navigate to a page: follow the guard's decision, or initialise the
    /// session record from the page's bootstrap payload.
    pub async fn load_page(&self, path: &str) -> Result<PageLoad, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(policy::HOME_PATH)
                .to_string();
            self.navigator.navigate(&location);
            return Ok(PageLoad::Redirected(location));
        }

        let status = response.status();
        let body = response.bytes().await?;
        let page: PageBootstrap = ApiResponse {
            status,
            content_type: None,
            body,
        }
        .error_for_status()?
        .json()?;

        self.session.initialize(page.session.clone()).await;
        self.navigator.navigate(&page.path);
        Ok(PageLoad::Rendered(page.session))
    }

    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }

    async fn call_refresh(&self) -> RefreshOutcome {
        match self
            .execute(&ApiRequest::new(Method::POST, REFRESH_ENDPOINT))
            .await
        {
            Ok(response) if response.status.is_success() => RefreshOutcome::Refreshed,
            Ok(response) => RefreshOutcome::Failed(
                message_of(&response.body).unwrap_or_else(|| response.status.to_string()),
            ),
            Err(e) => RefreshOutcome::Failed(e.to_string()),
        }
    }

    /// Clear the local session and leave for the login page unless already there.
    async fn end_session(&self) -> ClientError {
        self.session.clear().await;

        let current = self.navigator.current_path();
        let redirect = (current != policy::LOGIN_PATH).then(|| policy::login_redirect(&current));
        if let Some(location) = &redirect {
            self.navigator.navigate(location);
        }
        ClientError::LoginRequired { redirect }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn message_of(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
