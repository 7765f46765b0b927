/*
 * Responsibility
 * - GET /health (疎通用)
 * - session store の backend 名も返す
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "session_backend": state.sessions.name()})),
    )
}
