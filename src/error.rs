/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - response に ChainFailure を付け、session filter が失敗の種類を判別できるようにする
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::ChainFailure;
use crate::services::session::SessionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// I/O or protocol failure talking to a backend.
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    fn chain_failure(&self) -> ChainFailure {
        match self {
            AppError::Transport(_) => ChainFailure::recoverable(self.to_string()),
            AppError::Internal => ChainFailure::fatal(self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let failure = self.chain_failure();

        let (status, code, message) = match self {
            AppError::Transport(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "service unavailable".into(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            // Backend unreachable / command failed
            SessionError::Store(err) => AppError::transport(err.to_string()),

            // Session vanished mid-request or holds garbage
            SessionError::AlreadyInvalidated | SessionError::Document(_) => AppError::Internal,
        }
    }
}
