//! session の resource id を解決 → その identity で下流の handler chain を実行する
//!
//! - session が無い / attribute が無い: そのまま `next` を呼ぶ (scope なし)
//! - attribute がある: `AuthenticationPropagator::run_as` の中で `next` を呼ぶ
//! - scope 内の recoverable failure は ERROR で 1 回だけ log し、scope を抜けてから
//!   そのまま呼び出し元へ返す。fatal failure は log せずに返す

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use crate::services::auth::{Chain, ChainFuture, ChainOutcome, FailureKind};
use crate::services::session::{RequestSessions, SessionError};
use crate::state::AppState;

/// Apply the session authentication filter to every route of `router`.
///
/// The session middleware must wrap this layer:
/// ```ignore
/// let v1 = middleware::auth::session_auth::apply(v1, state.clone());
/// let v1 = middleware::session::apply(v1, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(
        state,
        session_auth_middleware,
    ))
}

async fn session_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    // Clone out of the request: `&Request` is not `Send` across awaits.
    let sessions = req
        .extensions()
        .get::<tower_sessions::Session>()
        .cloned()
        .map(RequestSessions::new);

    match resolve_resource_id(&state, sessions).await {
        Some(resource_id) => run_as_authenticated(&state, resource_id, req, next).await,
        None => next.run(req).await,
    }
}

async fn resolve_resource_id(state: &AppState, sessions: Option<RequestSessions>) -> Option<i64> {
    let Some(sessions) = sessions else {
        tracing::debug!("no session layer in front of the session auth filter");
        return None;
    };

    let session = match sessions.get_session(false).await {
        Ok(Some(session)) => session,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(error = ?err, "session lookup failed; continuing without identity");
            return None;
        }
    };

    let attribute = state.session_auth.authenticated_resource_id();
    match session.get::<i64>(attribute).await {
        Ok(resource_id) => resource_id,
        Err(SessionError::Document(err)) => {
            tracing::warn!(
                error = %err,
                attribute,
                "session attribute is not a resource id; continuing without identity"
            );
            None
        }
        Err(err) => {
            tracing::warn!(error = ?err, attribute, "session attribute read failed; continuing without identity");
            None
        }
    }
}

async fn run_as_authenticated(
    state: &AppState,
    resource_id: i64,
    req: Request,
    next: Next,
) -> Response {
    let chain: Chain = Box::new(move |req: Request| -> ChainFuture {
        Box::pin(async move {
            let outcome = ChainOutcome::from_response(next.run(req).await);

            if let Some(failure) = outcome.failure() {
                match failure.kind {
                    FailureKind::Recoverable => tracing::error!(
                        resource_id,
                        error = %failure,
                        "Authenticated process execution failed"
                    ),
                    FailureKind::Fatal => {}
                }
            }

            outcome
        })
    });

    state
        .propagator
        .run_as(resource_id, req, chain)
        .await
        .into_response()
}
