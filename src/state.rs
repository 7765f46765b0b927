/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - session store, session cookie 設定, session auth 設定, propagator
 * - Clone 前提で持つ (内部は Arc/Clone cheap)、起動後は immutable
 */
use std::sync::Arc;

use crate::config::SessionAuthConfig;
use crate::middleware::session::SessionCookie;
use crate::services::{
    auth::{AuthenticationContext, AuthenticationPropagator},
    session::SessionBackend,
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionBackend,
    pub session_cookie: SessionCookie,
    pub session_auth: Arc<SessionAuthConfig>,
    pub auth_context: AuthenticationContext,
    pub propagator: Arc<dyn AuthenticationPropagator>,
}

impl AppState {
    pub fn new(
        sessions: SessionBackend,
        session_cookie: SessionCookie,
        session_auth: SessionAuthConfig,
        auth_context: AuthenticationContext,
        propagator: Arc<dyn AuthenticationPropagator>,
    ) -> Self {
        Self {
            sessions,
            session_cookie,
            session_auth: Arc::new(session_auth),
            auth_context,
            propagator,
        }
    }
}
