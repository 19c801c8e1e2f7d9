//! POST /api/auth/register

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::identity::client::{self, GatewayError};
use crate::ocsf;
use crate::types::{MessageResponse, RegisterRequest};

/// Create an account upstream. Does not log the user in.
pub async fn register(
    State(state): State<Arc<crate::AppState>>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    match client::register(&state.http_client, &state.config, &body).await {
        Ok(()) => {
            ocsf::account_created_event(ocsf::STATUS_SUCCESS, &body.email, "Account registered");
            Ok(Json(MessageResponse {
                success: true,
                message: "Registration successful".into(),
            }))
        }
        Err(e) => {
            ocsf::account_created_event(
                ocsf::STATUS_FAILURE,
                &body.email,
                &format!("Registration failed: {}", e),
            );
            Err(match e {
                GatewayError::Rejected { status, message }
                | GatewayError::Server { status, message } => AppError::RegistrationFailed {
                    status: if status.is_client_error() || status.is_server_error() {
                        status
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    },
                    message,
                },
                other => other.into(),
            })
        }
    }
}
