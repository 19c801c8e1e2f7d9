//! Credential session handling.
//!
//! The credential pair lives only in httpOnly cookies. `CredentialJar`
//! carries it through a request; `Identity` is the decoded projection
//! handlers use for routing and UI decisions.

pub mod cookie;
pub mod middleware;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::identity::jwt::Claims;
use middleware::CredentialJar;

/// Request-scoped identity: claims of an unexpired access token, or `None`
/// when the visitor is anonymous. Never fails to extract.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Claims>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = crate::error::AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CredentialJar::from_request_parts(parts, state).await?;
        Ok(Identity(jar.identity().await))
    }
}
