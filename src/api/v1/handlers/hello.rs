/*
 * Responsibility
 * - GET /hello (session auth の動作確認用 resource)
 * - 現在の resource id と、新しく session に保存した resource id を "<current>:<new>" で返す
 * - 次の request では <new> が current として見えるはず
 */
use axum::extract::State;
use uuid::Uuid;

use crate::{
    api::v1::extractors::{CurrentResource, Sessions},
    error::AppError,
    state::AppState,
};

pub async fn hello(
    State(state): State<AppState>,
    CurrentResource(ctx): CurrentResource,
    Sessions(sessions): Sessions,
) -> Result<String, AppError> {
    let session = sessions.get_session(true).await?.ok_or(AppError::Internal)?;

    let new_resource_id = random_resource_id();
    tracing::debug!(
        authenticated_resource_id = ?ctx.authenticated_resource_id(),
        new_resource_id,
        "rotating resource identity"
    );
    session
        .set_attribute(
            state.session_auth.authenticated_resource_id(),
            new_resource_id,
        )
        .await?;

    Ok(format!("{}:{}", ctx.current_resource_id(), new_resource_id))
}

fn random_resource_id() -> i64 {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    high as i64
}
