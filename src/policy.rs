//! Route classification: which backend endpoints need a credential, and
//! which page paths are protected, role-restricted, or anonymous-only.
//!
//! Prefix matching is segment-aware: `/admin` covers `/admin` and
//! `/admin/users` but not `/administrator`.

use crate::identity::jwt::Role;

/// Backend endpoints (without the `/api` prefix) that accept anonymous calls.
pub const DEFAULT_PUBLIC_ENDPOINTS: &[&str] = &[
    "/campaigns/featured",
    "/campaigns/public",
    "/statistics/impact",
    "/statistics/global",
    "/core/donations/recent",
    "/core/campaigns",
];

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Page prefixes that require a session, with an optional role restriction.
/// More specific entries must come first.
const PROTECTED_PAGES: &[(&str, Option<Role>)] = &[
    ("/admin", Some(Role::Admin)),
    ("/campaign-manager", Some(Role::Organizer)),
    ("/profile", None),
    ("/dashboard", None),
];

/// Pages only meaningful to anonymous visitors.
const ANONYMOUS_ONLY_PAGES: &[&str] = &[LOGIN_PATH, REGISTER_PATH];

/// Whether a proxied backend call must carry a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAccess {
    Public,
    Protected,
}

/// Access class of a page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAccess {
    Public,
    AnonymousOnly,
    Protected,
    RoleRestricted(Role),
}

/// Static classification table for API and page paths.
#[derive(Debug, Clone)]
pub struct RouteTable {
    public_endpoints: Vec<String>,
}

impl RouteTable {
    pub fn new(public_endpoints: Vec<String>) -> Self {
        Self { public_endpoints }
    }

    /// Classify a backend path such as `/core/campaigns/42`.
    ///
    /// Anything not listed as public is protected.
    pub fn classify_api(&self, path: &str) -> ApiAccess {
        if self
            .public_endpoints
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
        {
            ApiAccess::Public
        } else {
            ApiAccess::Protected
        }
    }

    /// Classify a page path. Each path falls into exactly one class.
    pub fn classify_page(&self, path: &str) -> PageAccess {
        if ANONYMOUS_ONLY_PAGES.contains(&path) {
            return PageAccess::AnonymousOnly;
        }
        for (prefix, role) in PROTECTED_PAGES {
            if matches_prefix(path, prefix) {
                return match role {
                    Some(role) => PageAccess::RoleRestricted(*role),
                    None => PageAccess::Protected,
                };
            }
        }
        PageAccess::Public
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_PUBLIC_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

/// Landing page for an authenticated user bounced off login/registration.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Organizer => "/campaign-manager",
        Role::Donor => "/profile",
    }
}

/// `/login?callbackUrl=<encoded target>`
pub fn login_redirect(target: &str) -> String {
    format!(
        "{}?{}={}",
        LOGIN_PATH,
        CALLBACK_PARAM,
        urlencoding::encode(target)
    )
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_prefixes() {
        let table = RouteTable::default();
        assert_eq!(table.classify_api("/core/campaigns"), ApiAccess::Public);
        assert_eq!(table.classify_api("/core/campaigns/42"), ApiAccess::Public);
        assert_eq!(table.classify_api("/statistics/impact"), ApiAccess::Public);
        assert_eq!(
            table.classify_api("/core/donations/recent"),
            ApiAccess::Public
        );
    }

    #[test]
    fn test_unlisted_api_paths_are_protected() {
        let table = RouteTable::default();
        assert_eq!(table.classify_api("/core/withdrawals"), ApiAccess::Protected);
        assert_eq!(table.classify_api("/identity/users/me"), ApiAccess::Protected);
        assert_eq!(table.classify_api("/"), ApiAccess::Protected);
        // Prefix must end on a segment boundary.
        assert_eq!(table.classify_api("/core/campaignsx"), ApiAccess::Protected);
    }

    #[test]
    fn test_custom_public_endpoints() {
        let table = RouteTable::new(vec!["/files".into()]);
        assert_eq!(table.classify_api("/files/upload"), ApiAccess::Public);
        assert_eq!(table.classify_api("/core/campaigns"), ApiAccess::Protected);
    }

    #[test]
    fn test_page_classification() {
        let table = RouteTable::default();
        assert_eq!(table.classify_page("/"), PageAccess::Public);
        assert_eq!(table.classify_page("/campaigns/abc"), PageAccess::Public);
        assert_eq!(table.classify_page("/login"), PageAccess::AnonymousOnly);
        assert_eq!(table.classify_page("/register"), PageAccess::AnonymousOnly);
        assert_eq!(table.classify_page("/profile/settings"), PageAccess::Protected);
        assert_eq!(table.classify_page("/dashboard"), PageAccess::Protected);
        assert_eq!(
            table.classify_page("/admin/kyc"),
            PageAccess::RoleRestricted(Role::Admin)
        );
        assert_eq!(
            table.classify_page("/campaign-manager/withdrawals"),
            PageAccess::RoleRestricted(Role::Organizer)
        );
        assert_eq!(table.classify_page("/administrator"), PageAccess::Public);
    }

    #[test]
    fn test_landing_paths() {
        assert_eq!(landing_path(Role::Admin), "/admin");
        assert_eq!(landing_path(Role::Organizer), "/campaign-manager");
        assert_eq!(landing_path(Role::Donor), "/profile");
    }

    #[test]
    fn test_login_redirect_encodes_target() {
        assert_eq!(
            login_redirect("/profile/donations?page=2"),
            "/login?callbackUrl=%2Fprofile%2Fdonations%3Fpage%3D2"
        );
    }
}
