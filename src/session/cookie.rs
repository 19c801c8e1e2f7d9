//! Credential cookie formatting and parsing.
//!
//! Both cookies are `HttpOnly; SameSite=Lax; Path=/`, with `Secure` added in
//! production. Values are gateway-issued tokens and are written verbatim.

use axum::http::{HeaderMap, header};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Attributes shared by every credential cookie this service writes.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub access_max_age: u64,
    pub refresh_max_age: u64,
}

impl CookiePolicy {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            secure: config.production,
            access_max_age: config.access_token_max_age,
            refresh_max_age: config.refresh_token_max_age,
        }
    }
}

/// `Set-Cookie` value that stores `value` for `max_age` seconds.
pub fn make_set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut parts = vec![
        format!("{}={}", name, value),
        format!("Max-Age={}", max_age),
        "Path=/".into(),
        "HttpOnly".into(),
        "SameSite=Lax".into(),
    ];
    if secure {
        parts.push("Secure".into());
    }
    parts.join("; ")
}

/// `Set-Cookie` value that removes the cookie.
pub fn make_delete_cookie(name: &str, secure: bool) -> String {
    let mut parts = vec![
        format!("{}=", name),
        "Max-Age=0".into(),
        "Path=/".into(),
        "HttpOnly".into(),
        "SameSite=Lax".into(),
    ];
    if secure {
        parts.push("Secure".into());
    }
    parts.join("; ")
}

/// Parse a specific cookie from a Cookie header value.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}

/// Read a non-empty cookie from every `Cookie` header on the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|h| parse_cookie(h, name))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_cookie_found() {
        let header = "access_token=abc123; refresh_token=xyz";
        assert_eq!(parse_cookie(header, ACCESS_TOKEN_COOKIE), Some("abc123"));
        assert_eq!(parse_cookie(header, REFRESH_TOKEN_COOKIE), Some("xyz"));
    }

    #[test]
    fn test_parse_cookie_not_found() {
        assert_eq!(parse_cookie("other=xyz", ACCESS_TOKEN_COOKIE), None);
        assert_eq!(parse_cookie("", ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_parse_cookie_requires_exact_name() {
        assert_eq!(parse_cookie("access_token_old=1", ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_read_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("refresh_token=R1"));
        assert_eq!(
            read_cookie(&headers, REFRESH_TOKEN_COOKIE).as_deref(),
            Some("R1")
        );
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_read_cookie_ignores_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_make_set_cookie_format() {
        let cookie = make_set_cookie(ACCESS_TOKEN_COOKIE, "T1", 3600, false);
        assert!(cookie.starts_with("access_token=T1;"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_make_set_cookie_secure() {
        let cookie = make_set_cookie(REFRESH_TOKEN_COOKIE, "R1", 604_800, true);
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn test_make_delete_cookie() {
        let cookie = make_delete_cookie(ACCESS_TOKEN_COOKIE, false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("HttpOnly"));
    }
}
