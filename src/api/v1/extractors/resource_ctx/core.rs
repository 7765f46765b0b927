use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::state::AppState;

use super::ResourceCtx;

/// Handler で ResourceCtx を受け取るための extractor
/// filter が bind していない request では default resource を返す（reject しない）
pub struct CurrentResource(pub ResourceCtx);

impl FromRequestParts<AppState> for CurrentResource {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentResource(state.auth_context.current(&parts.extensions)))
    }
}
