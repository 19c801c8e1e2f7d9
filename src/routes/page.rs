//! Page bootstrap: the session snapshot a page load starts from.

use axum::Json;
use axum::http::Uri;

use crate::session::Identity;
use crate::types::{PageBootstrap, SessionRecord, UserInfo};

/// Served for every navigation the route guard lets through.
pub async fn bootstrap(uri: Uri, Identity(claims): Identity) -> Json<PageBootstrap> {
    Json(PageBootstrap {
        path: uri.path().to_string(),
        session: SessionRecord::for_user(claims.map(UserInfo::from)),
    })
}
