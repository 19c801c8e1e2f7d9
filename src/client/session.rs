//! Client-visible session record, owned by one client instance.

use tokio::sync::RwLock;

use crate::types::{SessionRecord, UserInfo};

/// Holds the `{user, isAuthenticated}` record for the current page load.
///
/// Initialised once from the server-decoded snapshot, then mutated only by
/// login, logout and refresh outcomes.
#[derive(Debug, Default)]
pub struct SessionContext {
    record: RwLock<SessionRecord>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record with a page-load snapshot.
    pub async fn initialize(&self, record: SessionRecord) {
        *self.record.write().await = record;
    }

    pub async fn set_user(&self, user: UserInfo) {
        *self.record.write().await = SessionRecord::for_user(Some(user));
    }

    pub async fn clear(&self) {
        *self.record.write().await = SessionRecord::anonymous();
    }

    pub async fn snapshot(&self) -> SessionRecord {
        self.record.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.record.read().await.is_authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo {
            sub: "a@x.com".into(),
            email: "a@x.com".into(),
            role: None,
            iat: None,
            exp: None,
        }
    }

    #[tokio::test]
    async fn test_starts_anonymous() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_authenticated().await);
        assert!(ctx.snapshot().await.user.is_none());
    }

    #[tokio::test]
    async fn test_set_user_then_clear() {
        let ctx = SessionContext::new();
        ctx.set_user(user()).await;
        assert!(ctx.is_authenticated().await);
        assert_eq!(ctx.snapshot().await.user.unwrap().email, "a@x.com");

        ctx.clear().await;
        assert_eq!(ctx.snapshot().await, SessionRecord::anonymous());
    }

    #[tokio::test]
    async fn test_initialize_replaces_record() {
        let ctx = SessionContext::new();
        ctx.initialize(SessionRecord::for_user(Some(user()))).await;
        assert!(ctx.is_authenticated().await);
    }
}
