//! Unverified JWT claim decoding for gateway-issued access tokens.
//!
//! The gateway signs tokens and verifies them on every call; the BFF only
//! reads claims for routing and UI decisions, so no signature check is
//! performed here. `exp` and `iat` are seconds since the Unix epoch.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// User role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Organizer,
    Donor,
}

impl Role {
    /// Parse `ADMIN` or the identity service's `ROLE_ADMIN` scope form.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.strip_prefix("ROLE_").unwrap_or(raw);
        match name.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "ORGANIZER" => Some(Role::Organizer),
            "DONOR" => Some(Role::Donor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Organizer => "ORGANIZER",
            Role::Donor => "DONOR",
        }
    }
}

/// Identity claims projected from an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    pub exp: u64,
}

impl Claims {
    /// True when `exp` is strictly after `now_secs`.
    pub fn is_live_at(&self, now_secs: u64) -> bool {
        self.exp > now_secs
    }
}

/// Wire shape of the payload before normalisation.
///
/// The identity service emits `scope: "ROLE_DONOR"` and uses the e-mail as
/// `sub`; other issuers send `role` and `email` directly.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    email: Option<String>,
    role: Option<String>,
    scope: Option<String>,
    iat: Option<u64>,
    exp: Option<u64>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = JwtError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = raw.sub.ok_or(JwtError::MissingClaim("sub"))?;
        let exp = raw.exp.ok_or(JwtError::MissingClaim("exp"))?;

        let role = raw
            .role
            .as_deref()
            .and_then(Role::parse)
            .or_else(|| {
                raw.scope
                    .as_deref()
                    .and_then(|scope| scope.split_whitespace().find_map(Role::parse))
            })
            .ok_or(JwtError::MissingClaim("role"))?;

        let email = raw.email.unwrap_or_else(|| sub.clone());

        Ok(Claims {
            sub,
            email,
            role,
            iat: raw.iat,
            exp,
        })
    }
}

/// Decode a JWT payload without signature verification.
pub fn decode_jwt_unverified(token: &str) -> Result<Claims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::InvalidFormat);
    }

    // Some issuers pad the segments; URL_SAFE_NO_PAD rejects '='.
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| JwtError::InvalidFormat)?;

    serde_json::from_slice(&payload_bytes).map_err(|e| JwtError::InvalidPayload(e.to_string()))
}

/// Seconds since the Unix epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Claims of `token` if it decodes and has not expired at `now_secs`.
///
/// Decode failures and expiry both yield `None`: callers treat them alike.
pub fn authenticated_claims(token: &str, now_secs: u64) -> Option<Claims> {
    decode_jwt_unverified(token)
        .ok()
        .filter(|claims| claims.is_live_at(now_secs))
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Invalid JWT format")]
    InvalidFormat,

    #[error("Invalid JWT payload: {0}")]
    InvalidPayload(String),

    #[error("Token missing claim: {0}")]
    MissingClaim(&'static str),
}
