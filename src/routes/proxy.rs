//! ANY /api/{*path}: generic passthrough to the upstream gateway.
//!
//! `/api/core/campaigns?page=2` is forwarded to
//! `{BACKEND_URL}/core/campaigns?page=2`; the gateway routes by service
//! name so the `/api` prefix is dropped.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::RawBody;
use crate::identity::client::GatewayError;
use crate::policy::ApiAccess;
use crate::session::middleware::{Credential, CredentialJar};

const API_PREFIX: &str = "/api";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Forward one request upstream and mirror the reply.
pub async fn forward(
    State(state): State<Arc<crate::AppState>>,
    jar: CredentialJar,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Response, AppError> {
    let path = upstream_path(&uri);
    let access_token = jar.get(Credential::Access).await;

    if state.routes.classify_api(&path) == ApiAccess::Protected && access_token.is_none() {
        tracing::debug!(path = %path, "protected endpoint called without a credential");
        return Err(AppError::Unauthorized);
    }

    let target = match uri.query() {
        Some(query) if !query.is_empty() => {
            format!("{}?{}", state.config.gateway_url(&path), query)
        }
        _ => state.config.gateway_url(&path),
    };

    let mut request = state
        .http_client
        .request(method.clone(), &target)
        .header(header::CACHE_CONTROL, "no-store");

    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(header::CONTENT_TYPE, content_type.clone());
    }
    // Attached on public endpoints too; the gateway may personalise them.
    if let Some(token) = &access_token {
        request = request.bearer_auth(token);
    }
    // Multipart and text bodies alike are forwarded byte-for-byte.
    if carries_body(&method) && !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(GatewayError::from_transport)?;
    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream
        .bytes()
        .await
        .map_err(GatewayError::from_transport)?;

    tracing::debug!(%method, path = %path, status = status.as_u16(), "proxied");

    mirror_response(status, content_type, bytes)
}

/// Request path with the `/api` prefix removed, always starting with `/`.
fn upstream_path(uri: &Uri) -> String {
    let rest = uri.path().strip_prefix(API_PREFIX).unwrap_or(uri.path());
    format!("/{}", rest.trim_start_matches('/'))
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("application/json"))
}

/// Rebuild the upstream reply: JSON is parsed and re-emitted, anything else
/// is passed through as raw bytes under its original content type.
fn mirror_response(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    bytes: Bytes,
) -> Result<Response, AppError> {
    if is_json(content_type.as_ref()) {
        if bytes.is_empty() {
            return Ok(status.into_response());
        }
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::UpstreamError(format!("Invalid JSON from upstream: {}", e)))?;
        return Ok((status, axum::Json(value)).into_response());
    }

    let content_type =
        content_type.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}
