/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /hello, /logout-action
 * - session / session auth の middleware は app.rs 側で Router 全体に掛ける
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{health::health, hello::hello, logout::logout};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/hello", get(hello))
        .route("/logout-action", get(logout).post(logout))
}
