//! POST /api/auth/refresh

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::error::AppError;
use crate::identity::client;
use crate::identity::jwt::decode_jwt_unverified;
use crate::ocsf;
use crate::session::middleware::{Credential, CredentialJar};
use crate::types::SuccessResponse;

/// Exchange the refresh cookie for a new access token.
///
/// Any failure clears both cookies: a session that cannot refresh is over.
pub async fn refresh_tokens(
    State(state): State<Arc<crate::AppState>>,
    jar: CredentialJar,
) -> Result<Json<SuccessResponse>, AppError> {
    let access_token = jar.get(Credential::Access).await;
    let Some(refresh_token) = jar.get(Credential::Refresh).await else {
        jar.clear().await;
        return Err(AppError::NoSession);
    };

    // Expired tokens still name the user for the audit trail.
    let email = access_token
        .as_deref()
        .and_then(|t| decode_jwt_unverified(t).ok())
        .map(|c| c.email);

    match client::refresh_token(
        &state.http_client,
        &state.config,
        access_token.as_deref(),
        &refresh_token,
    )
    .await
    {
        Ok(result) => {
            jar.set(Credential::Access, result.token).await;
            // Rotate only when the gateway issued a new refresh token
            if let Some(rotated) = result.refresh_token {
                jar.set(Credential::Refresh, rotated).await;
            }

            ocsf::authentication_event(
                ocsf::ACTIVITY_SERVICE_TICKET,
                "Service Ticket",
                ocsf::STATUS_SUCCESS,
                ocsf::SEVERITY_INFORMATIONAL,
                email.as_deref(),
                "Token refresh succeeded",
            );

            Ok(Json(SuccessResponse { success: true }))
        }
        Err(e) => {
            ocsf::authentication_event(
                ocsf::ACTIVITY_SERVICE_TICKET,
                "Service Ticket",
                ocsf::STATUS_FAILURE,
                ocsf::SEVERITY_MEDIUM,
                email.as_deref(),
                &format!("Token refresh failed: {}", e),
            );

            jar.clear().await;
            Err(AppError::RefreshFailed(e.to_string()))
        }
    }
}
