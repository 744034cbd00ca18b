//! Admin-view wrapper: bearer-token check for admin routes.

use axum::http::{header, HeaderMap};

/// Whether the request may use admin views.
///
/// With no token configured the admin is open.
pub fn is_authorized(admin_token: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = admin_token else {
        return true;
    };

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|provided| provided.trim() == expected)
        .unwrap_or(false)
}
