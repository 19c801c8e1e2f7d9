//! Gateway identity-service client: token issue, refresh, logout, registration.
//!
//! Every identity endpoint answers with the same envelope,
//! `{code, message?, result?}`, where `code == 1000` means success.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::types::RegisterRequest;

pub const TOKEN_PATH: &str = "/identity/auth/token";
pub const LOGOUT_PATH: &str = "/identity/auth/logout";
pub const REFRESH_PATH: &str = "/identity/auth/refresh";
pub const USERS_PATH: &str = "/identity/users";

/// Envelope success code.
pub const SUCCESS_CODE: i64 = 1000;

/// Gateway response envelope.
#[derive(Debug, Deserialize)]
pub struct GatewayEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub result: Option<T>,
}

/// `result` of the token and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    token: &'a str,
}

/// Exchange e-mail and password for a credential pair.
pub async fn issue_token(
    http_client: &reqwest::Client,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<AuthResult, GatewayError> {
    let body = TokenRequest { email, password };
    gateway_request::<_, AuthResult>(http_client, config, TOKEN_PATH, &body)
        .await?
        .ok_or_else(|| GatewayError::Malformed("missing result".into()))
}

/// Exchange the refresh token (and the access token, when still held) for a new pair.
pub async fn refresh_token(
    http_client: &reqwest::Client,
    config: &Config,
    access_token: Option<&str>,
    refresh_token: &str,
) -> Result<AuthResult, GatewayError> {
    let body = RefreshRequest {
        token: access_token,
        refresh_token,
    };
    gateway_request::<_, AuthResult>(http_client, config, REFRESH_PATH, &body)
        .await?
        .ok_or_else(|| GatewayError::Malformed("missing result".into()))
}

/// Invalidate an access token upstream.
pub async fn logout(
    http_client: &reqwest::Client,
    config: &Config,
    access_token: &str,
) -> Result<(), GatewayError> {
    let body = LogoutRequest {
        token: access_token,
    };
    gateway_request::<_, serde_json::Value>(http_client, config, LOGOUT_PATH, &body)
        .await
        .map(|_| ())
}

/// Create a user account.
pub async fn register(
    http_client: &reqwest::Client,
    config: &Config,
    request: &RegisterRequest,
) -> Result<(), GatewayError> {
    gateway_request::<_, serde_json::Value>(http_client, config, USERS_PATH, request)
        .await
        .map(|_| ())
}

/// POST a JSON body to a gateway path and unwrap the envelope.
///
/// Checks the HTTP status AND the envelope code.
pub async fn gateway_request<B, T>(
    http_client: &reqwest::Client,
    config: &Config,
    path: &str,
    body: &B,
) -> Result<Option<T>, GatewayError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let resp = http_client
        .post(config.gateway_url(path))
        .json(body)
        .send()
        .await
        .map_err(GatewayError::from_transport)?;

    // Capture status before consuming the body
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(GatewayError::from_transport)?;

    if !status.is_success() {
        let message = serde_json::from_slice::<GatewayEnvelope<serde_json::Value>>(&bytes)
            .ok()
            .and_then(|env| env.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Gateway request failed")
                    .to_string()
            });
        return Err(if status.is_server_error() {
            GatewayError::Server { status, message }
        } else {
            GatewayError::Rejected { status, message }
        });
    }

    let envelope: GatewayEnvelope<T> =
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    if envelope.code != SUCCESS_CODE {
        return Err(GatewayError::Rejected {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| format!("Gateway returned code {}", envelope.code)),
        });
    }

    Ok(envelope.result)
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Gateway request timed out")]
    Timeout,

    /// 4xx, or a 2xx whose envelope carries a non-success code.
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Gateway error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::RequestFailed(err.to_string())
        }
    }
}
