//! POST /api/auth/login

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::identity::client::{self, GatewayError};
use crate::identity::jwt::decode_jwt_unverified;
use crate::ocsf;
use crate::session::middleware::{Credential, CredentialJar};
use crate::types::{LoginRequest, LoginResponse, UserInfo};

/// Exchange credentials for a token pair and store it in cookies.
pub async fn login(
    State(state): State<Arc<crate::AppState>>,
    jar: CredentialJar,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let result = match client::issue_token(
        &state.http_client,
        &state.config,
        &body.email,
        &body.password,
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            ocsf::authentication_event(
                ocsf::ACTIVITY_LOGON,
                "Logon",
                ocsf::STATUS_FAILURE,
                ocsf::SEVERITY_MEDIUM,
                Some(body.email.as_str()),
                &format!("Login failed: {}", e),
            );
            return Err(match e {
                GatewayError::Rejected { .. } => AppError::InvalidCredentials,
                other => other.into(),
            });
        }
    };

    let refresh_token = result
        .refresh_token
        .ok_or_else(|| AppError::UpstreamError("Gateway issued no refresh token".into()))?;

    jar.set(Credential::Access, result.token.clone()).await;
    jar.set(Credential::Refresh, refresh_token).await;

    // Opaque tokens still log the user in; the projection falls back to the request.
    let user = match decode_jwt_unverified(&result.token) {
        Ok(claims) => UserInfo::from(claims),
        Err(e) => {
            tracing::warn!(error = %e, "access token is not a decodable JWT");
            UserInfo {
                sub: body.email.clone(),
                email: body.email.clone(),
                role: None,
                iat: None,
                exp: None,
            }
        }
    };

    ocsf::authentication_event(
        ocsf::ACTIVITY_LOGON,
        "Logon",
        ocsf::STATUS_SUCCESS,
        ocsf::SEVERITY_INFORMATIONAL,
        Some(user.email.as_str()),
        "Login succeeded",
    );

    Ok(Json(LoginResponse {
        success: true,
        user,
    }))
}
