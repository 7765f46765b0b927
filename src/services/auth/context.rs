/*
 * Responsibility
 * - Handler から見える「現在の resource identity」の型
 * - filter が request extensions に格納し、handler は extractor 経由でこの型だけを受け取る
 */
use axum::http::Extensions;

/// Resource identity the current request runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCtx {
    resource_id: i64,
    authenticated: bool,
}

impl ResourceCtx {
    pub fn authenticated(resource_id: i64) -> Self {
        Self {
            resource_id,
            authenticated: true,
        }
    }

    pub fn default_resource(default_resource_id: i64) -> Self {
        Self {
            resource_id: default_resource_id,
            authenticated: false,
        }
    }

    pub fn current_resource_id(&self) -> i64 {
        self.resource_id
    }

    /// `Some` only when an identity was bound from the session.
    pub fn authenticated_resource_id(&self) -> Option<i64> {
        self.authenticated.then_some(self.resource_id)
    }
}

/// Read side of the identity binding.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticationContext {
    default_resource_id: i64,
}

impl AuthenticationContext {
    pub fn new(default_resource_id: i64) -> Self {
        Self {
            default_resource_id,
        }
    }

    pub fn current(&self, extensions: &Extensions) -> ResourceCtx {
        extensions
            .get::<ResourceCtx>()
            .copied()
            .unwrap_or_else(|| ResourceCtx::default_resource(self.default_resource_id))
    }
}
