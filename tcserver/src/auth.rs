//! Caller identification at the HTTP boundary.

use axum::http::HeaderMap;
use tickerchat::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the signed-in user for a request, if any.
pub trait AuthProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Trusts a user id header set by an upstream proxy.
#[derive(Debug, Clone)]
pub struct HeaderAuthProvider {
    header: String,
}

impl Default for HeaderAuthProvider {
    fn default() -> Self {
        Self {
            header: USER_ID_HEADER.to_string(),
        }
    }
}

impl HeaderAuthProvider {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl AuthProvider for HeaderAuthProvider {
    fn identify(&self, headers: &HeaderMap) -> Option<UserId> {
        let value = headers.get(self.header.as_str())?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| UserId::new(value))
    }
}
