//! Test utilities: token factory, test app builder, request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use donation_bff::config::Config;
use donation_bff::{AppState, create_app};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

/// Secret the mock identity service signs with.
pub const SIGNING_KEY: &[u8] = b"test-signing-key-for-identity-service-0123456789";

pub fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Identity-service shaped claims: e-mail subject, `ROLE_` scope.
pub fn user_claims(email: &str, role: &str) -> Value {
    let now = now();
    json!({
        "sub": email,
        "scope": format!("ROLE_{role}"),
        "user_id": "u-1",
        "iss": "tamsang.vn",
        "iat": now,
        "exp": now + 3600
    })
}

/// Claims that expired long ago.
pub fn expired_claims(email: &str, role: &str) -> Value {
    json!({
        "sub": email,
        "scope": format!("ROLE_{role}"),
        "iat": 900,
        "exp": 1000
    })
}

/// HS512 token, as minted by the identity service.
pub fn sign_jwt(claims: &Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS512),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(SIGNING_KEY),
    )
    .expect("failed to sign JWT")
}

/// Build an unsigned JWT (the BFF never verifies signatures).
pub fn make_unsigned_jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS512","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    let sig = URL_SAFE_NO_PAD.encode(b"fake-signature");
    format!("{header}.{payload}.{sig}")
}

/// Gateway success envelope.
pub fn envelope(result: Value) -> Value {
    json!({"code": 1000, "result": result})
}

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.backend_url = server.uri();
    config
}

/// Build a test app pointed at the given config.
pub fn build_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).expect("failed to build state"));
    let app = create_app(state.clone());
    (app, state)
}

/// Build a test app whose gateway is `server`.
pub fn build_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    build_test_app_with_config(config_for(server))
}

/// Request carrying the given credential cookies.
pub fn request_with_cookies(
    method: &str,
    uri: &str,
    access: Option<&str>,
    refresh: Option<&str>,
    body: Body,
) -> Request<Body> {
    let cookies: Vec<String> = [("access_token", access), ("refresh_token", refresh)]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| format!("{name}={v}")))
        .collect();

    let mut builder = Request::builder().method(method).uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies.join("; "));
    }
    builder.body(body).unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// All Set-Cookie header values on a response.
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

/// The Set-Cookie value for `name`, if present.
pub fn set_cookie_for(headers: &HeaderMap, name: &str) -> Option<String> {
    set_cookies(headers)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
}

/// Cookie value written by a Set-Cookie header, `""` for deletions.
pub fn cookie_value(set_cookie: &str) -> &str {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, v)| v)
        .unwrap_or("")
}

/// Helper to read response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
