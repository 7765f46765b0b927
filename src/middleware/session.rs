//! Session cookie binding (tower-sessions).
//!
//! Loads the client's session lazily from the configured store and hands
//! downstream code a `tower_sessions::Session` through the request
//! extensions. Every response of a live session saves it again, which makes
//! the expiry an idle timeout. Must sit outside the session authentication
//! filter.

use std::time::Duration;

use axum::Router;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, cookie::SameSite};

use crate::state::AppState;

/// Attributes of the session cookie and the idle timeout.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    idle_timeout: Duration,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool, idle_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            idle_timeout,
        }
    }

    fn expiry(&self) -> Expiry {
        let idle = time::Duration::try_from(self.idle_timeout).unwrap_or(time::Duration::MAX);
        Expiry::OnInactivity(idle)
    }
}

pub fn layer<S: SessionStore + Clone>(store: S, cookie: &SessionCookie) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(cookie.name.clone())
        .with_path("/")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(cookie.secure)
        .with_expiry(cookie.expiry())
        .with_always_save(true)
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(layer(state.sessions.clone(), &state.session_cookie))
}
