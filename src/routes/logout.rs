//! POST /api/auth/logout

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::identity::client;
use crate::ocsf;
use crate::session::middleware::{Credential, CredentialJar};
use crate::types::SuccessResponse;

/// Invalidate the token upstream (best-effort) and clear both cookies.
pub async fn logout(
    State(state): State<Arc<crate::AppState>>,
    jar: CredentialJar,
) -> Json<SuccessResponse> {
    let email = jar.identity().await.map(|c| c.email);

    if let Some(token) = jar.get(Credential::Access).await
        && let Err(e) = client::logout(&state.http_client, &state.config, &token).await
    {
        tracing::warn!(error = %e, "upstream logout failed; clearing cookies anyway");
    }

    jar.clear().await;

    ocsf::authentication_event(
        ocsf::ACTIVITY_LOGOFF,
        "Logoff",
        ocsf::STATUS_SUCCESS,
        ocsf::SEVERITY_INFORMATIONAL,
        email.as_deref(),
        "User logged out",
    );

    Json(SuccessResponse { success: true })
}
