use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::services::session::RequestSessions;
use crate::state::AppState;

/// session layer が tower_sessions::Session を insert 済みである前提
/// 見つからない場合は配線ミスなので 500 を返す
pub struct Sessions(pub RequestSessions);

impl FromRequestParts<AppState> for Sessions {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<tower_sessions::Session>()
            .cloned()
            .map(|session| Sessions(RequestSessions::new(session)))
            .ok_or_else(|| {
                tracing::error!("session layer is not installed");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }
}
