//! Shared request/response DTOs.
//!
//! Field names follow the frontend's JSON contract (camelCase).

use serde::{Deserialize, Serialize};

use crate::identity::jwt::{Claims, Role};

/// POST /api/auth/login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

/// User projection returned to the browser.
///
/// Built from the access token's claims; `role` and the timestamps are
/// absent only when the gateway issued a token the codec cannot read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl From<Claims> for UserInfo {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            email: claims.email,
            role: Some(claims.role),
            iat: claims.iat,
            exp: Some(claims.exp),
        }
    }
}

/// POST /api/auth/login success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserInfo,
}

/// Generic success response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `{success, message}` response (registration, failures).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Client-visible session state for one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user: Option<UserInfo>,
    pub is_authenticated: bool,
}

impl SessionRecord {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: Option<UserInfo>) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
        }
    }
}

/// Payload served for an allowed page navigation: the server-decoded
/// session the client-side store is initialised from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageBootstrap {
    pub path: String,
    #[serde(flatten)]
    pub session: SessionRecord,
}

/// GET /health response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: String,
    pub backend: String,
}
