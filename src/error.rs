//! Application error types with Axum response mapping.
//!
//! Each variant maps to a specific HTTP status + JSON body of the shape the
//! frontend expects: `{"success": false, "message": ..., "error"?: ...}`.

use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::identity::client::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No session")]
    NoSession,

    #[error("Refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Unauthorized - No access token")]
    Unauthorized,

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body the extractor could not accept; keeps its status.
    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Registration failed: {message}")]
    RegistrationFailed { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => AppError::UpstreamTimeout,
            other => AppError::UpstreamError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::NoSession
            | AppError::RefreshFailed(_)
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody { status, .. } | AppError::RegistrationFailed { status, .. } => {
                *status
            }
            AppError::UpstreamError(_) | AppError::UpstreamTimeout | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            AppError::InvalidCredentials => {
                json!({"success": false, "message": "Invalid credentials"})
            }
            AppError::NoSession => json!({"success": false, "message": "No session"}),
            AppError::RefreshFailed(msg) => json!({
                "success": false,
                "message": "Token refresh failed",
                "error": msg
            }),
            AppError::Unauthorized => json!({
                "success": false,
                "message": "Unauthorized - No access token"
            }),
            AppError::UpstreamError(msg) | AppError::Internal(msg) => json!({
                "success": false,
                "message": "Internal Server Error",
                "error": msg
            }),
            AppError::UpstreamTimeout => json!({
                "success": false,
                "message": "Internal Server Error",
                "error": "Upstream request timed out"
            }),
            AppError::BadRequest(msg) => json!({"success": false, "message": msg}),
            AppError::InvalidBody { message, .. } | AppError::RegistrationFailed { message, .. } => {
                json!({"success": false, "message": message})
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (self.status(), axum::Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials() {
        let err = AppError::InvalidCredentials;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        let body = err.body();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[test]
    fn test_no_session_and_refresh_failed_are_401() {
        assert_eq!(AppError::NoSession.status(), StatusCode::UNAUTHORIZED);
        let err = AppError::RefreshFailed("revoked".into());
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body()["error"], "revoked");
    }

    #[test]
    fn test_unauthorized() {
        let err = AppError::Unauthorized;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body()["message"], "Unauthorized - No access token");
    }

    #[test]
    fn test_upstream_error_carries_diagnostic() {
        let err = AppError::UpstreamError("connection refused".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body["message"], "Internal Server Error");
        assert_eq!(body["error"], "connection refused");
    }

    #[test]
    fn test_timeout_treated_as_upstream_error() {
        let err = AppError::from(GatewayError::Timeout);
        assert!(matches!(err, AppError::UpstreamTimeout));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_gateway_rejection_converts_to_upstream_error() {
        let err = AppError::from(GatewayError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "nope".into(),
        });
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[test]
    fn test_registration_failed_mirrors_status() {
        let err = AppError::RegistrationFailed {
            status: StatusCode::CONFLICT,
            message: "User existed".into(),
        };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.body()["message"], "User existed");
    }

    #[test]
    fn test_invalid_body_keeps_rejection_status() {
        let err = AppError::InvalidBody {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `password`".into(),
        };
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = err.body();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "missing field `password`");
    }
}
