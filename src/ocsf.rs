//! OCSF (Open Cybersecurity Schema Framework) structured event logging.
//!
//! Authentication lifecycle events are emitted via `tracing::info!` on the
//! `ocsf` target as structured JSON. Never panics.

use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

// OCSF event class UIDs
pub const CLASS_AUTHENTICATION: u32 = 3001;
pub const CLASS_ACCOUNT_CHANGE: u32 = 3002;

// Activity IDs
pub const ACTIVITY_LOGON: u32 = 1;
pub const ACTIVITY_LOGOFF: u32 = 2;
pub const ACTIVITY_SERVICE_TICKET: u32 = 4; // Token refresh
pub const ACTIVITY_CREATE: u32 = 1; // Account change: create

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;

pub const AUTH_PROTOCOL_PASSWORD: u32 = 2;
pub const AUTH_PROTOCOL_PASSWORD_NAME: &str = "Password";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        4 => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

fn metadata() -> serde_json::Value {
    json!({
        "product": {
            "name": "donation-bff",
            "version": env!("CARGO_PKG_VERSION"),
            "vendor_name": "Donation Platform"
        }
    })
}

fn actor(email: &str) -> serde_json::Value {
    json!({
        "user": {
            "email_addr": email,
            "type_id": 1,
            "type": "User"
        }
    })
}

/// Emit an OCSF event as structured JSON via tracing. Never panics.
fn emit(event: &serde_json::Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "ocsf", "{}", json);
    }
}

/// Build an OCSF Authentication (3001) event.
pub fn authentication_event_json(
    activity_id: u32,
    activity_name: &str,
    status_id: u32,
    severity_id: u32,
    user_email: Option<&str>,
    message: &str,
) -> serde_json::Value {
    let mut event = json!({
        "class_uid": CLASS_AUTHENTICATION,
        "class_name": "Authentication",
        "activity_id": activity_id,
        "activity_name": activity_name,
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": metadata(),
        "auth_protocol_id": AUTH_PROTOCOL_PASSWORD,
        "auth_protocol": AUTH_PROTOCOL_PASSWORD_NAME,
        "message": message,
    });

    if let Some(email) = user_email {
        event["actor"] = actor(email);
    }
    event
}

/// Emit an OCSF Authentication (3001) event.
pub fn authentication_event(
    activity_id: u32,
    activity_name: &str,
    status_id: u32,
    severity_id: u32,
    user_email: Option<&str>,
    message: &str,
) {
    emit(&authentication_event_json(
        activity_id,
        activity_name,
        status_id,
        severity_id,
        user_email,
        message,
    ));
}

/// Emit an OCSF Account Change (3002) event for a registration attempt.
pub fn account_created_event(status_id: u32, user_email: &str, message: &str) {
    let severity_id = if status_id == STATUS_SUCCESS {
        SEVERITY_INFORMATIONAL
    } else {
        SEVERITY_LOW
    };
    let event = json!({
        "class_uid": CLASS_ACCOUNT_CHANGE,
        "class_name": "Account Change",
        "activity_id": ACTIVITY_CREATE,
        "activity_name": "Create",
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": metadata(),
        "actor": actor(user_email),
        "message": message,
    });
    emit(&event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_event_shape() {
        let event = authentication_event_json(
            ACTIVITY_LOGON,
            "Logon",
            STATUS_FAILURE,
            SEVERITY_MEDIUM,
            Some("a@x.com"),
            "Login failed",
        );
        assert_eq!(event["class_uid"], CLASS_AUTHENTICATION);
        assert_eq!(event["status"], "Failure");
        assert_eq!(event["severity"], "Medium");
        assert_eq!(event["actor"]["user"]["email_addr"], "a@x.com");
        assert_eq!(event["metadata"]["product"]["name"], "donation-bff");
    }

    #[test]
    fn test_anonymous_event_has_no_actor() {
        let event = authentication_event_json(
            ACTIVITY_LOGOFF,
            "Logoff",
            STATUS_SUCCESS,
            SEVERITY_INFORMATIONAL,
            None,
            "User logged out",
        );
        assert!(event.get("actor").is_none());
        assert_eq!(event["status"], "Success");
    }
}
