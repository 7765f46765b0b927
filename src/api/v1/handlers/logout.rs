/*
 * Responsibility
 * - GET|POST /logout-action
 * - session を invalidate し、logged-out URL (または request parameter の override) へ 302 redirect
 * - client には決してエラーを見せない
 */
use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::v1::extractors::Sessions,
    services::{auth::redirect, session::SessionError},
    state::AppState,
};

// Upper bound for a urlencoded logout form.
const MAX_FORM_BYTES: usize = 16 * 1024;

pub async fn logout(
    State(state): State<AppState>,
    Sessions(sessions): Sessions,
    req: Request,
) -> Response {
    match sessions.get_session(false).await {
        Ok(Some(session)) => match session.invalidate().await {
            Ok(()) => tracing::debug!("session invalidated"),
            // Expected when the same client logs out twice concurrently.
            Err(SessionError::AlreadyInvalidated) => {
                tracing::debug!("session was already invalidated")
            }
            Err(err) => tracing::warn!(error = ?err, "session invalidation failed"),
        },
        Ok(None) => {}
        Err(err) => tracing::warn!(error = ?err, "session lookup failed during logout"),
    }

    let param_name = state.session_auth.req_param_name_logged_out_url();
    let location = match override_target(param_name, req).await {
        Some(target) => location_for(&target).unwrap_or_else(|| {
            tracing::debug!(param = param_name, "ignoring unusable logged-out URL override");
            state.session_auth.logged_out_location().clone()
        }),
        None => state.session_auth.logged_out_location().clone(),
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn location_for(target: &str) -> Option<HeaderValue> {
    let encoded = redirect::encode_untrusted(target)?;
    HeaderValue::from_str(&encoded).ok()
}

/// First non-blank value of `name`: query string first, then a urlencoded
/// POST body.
async fn override_target(name: &str, req: Request) -> Option<String> {
    if let Some(value) = req.uri().query().and_then(|query| find_param(query.as_bytes(), name)) {
        return Some(value);
    }

    if req.method() != Method::POST || !is_form(&req) {
        return None;
    }

    match to_bytes(req.into_body(), MAX_FORM_BYTES).await {
        Ok(body) => find_param(&body, name),
        Err(err) => {
            tracing::debug!(error = ?err, "logout form body could not be read");
            None
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn find_param(input: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}
