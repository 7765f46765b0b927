//! Security-related response headers.
//!
//! Responses here are either session-bound (`/hello`) or redirects that
//! carry a client-chosen target (`/logout-action`):
//! - never framed
//! - never MIME-sniffed
//! - the logout target does not leak through `Referer`
//! - shared caches never replay one client's identity to another

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "DENY"),
    ("content-security-policy", "frame-ancestors 'none'"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("cache-control", "no-store"),
];

/// Apply the headers to every response that does not set them itself.
pub fn apply(router: Router) -> Router {
    HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::Request,
        http::{StatusCode, header},
        response::IntoResponse,
        routing::get,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn redirects_carry_every_header() {
        let app = apply(Router::new().route(
            "/out",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/bye")]).into_response() }),
        ));

        let response = app
            .oneshot(Request::builder().uri("/out").body(Body::empty()).unwrap())
            .await
            .unwrap();

        for (name, value) in HEADERS {
            assert_eq!(response.headers().get(name).unwrap(), value, "{name}");
        }
    }

    #[tokio::test]
    async fn handler_headers_win() {
        let app = apply(Router::new().route(
            "/cached",
            get(|| async { ([(header::CACHE_CONTROL, "private, max-age=5")], "ok") }),
        ));

        let response = app
            .oneshot(Request::builder().uri("/cached").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "private, max-age=5"
        );
    }
}
