/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (session store, propagator) → Router 組み立て
 * - Middleware の適用 (http / security headers / session / session auth)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    middleware::session::SessionCookie,
    services::{
        auth::{AuthenticationContext, RequestScopePropagator},
        session::build_session_store,
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,session_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        // Production: default hook, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting session auth service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let sessions = build_session_store(config).await?;

    Ok(AppState::new(
        sessions,
        SessionCookie::new(
            config.session_cookie_name.clone(),
            config.app_env.is_production(),
            config.session_ttl,
        ),
        config.session_auth.clone(),
        AuthenticationContext::new(config.default_resource_id),
        Arc::new(RequestScopePropagator),
    ))
}

fn build_router(state: AppState) -> Router {
    // Inner → outer: session auth filter, session cookie.
    let v1 = api::v1::routes();
    let v1 = middleware::auth::session_auth::apply(v1, state.clone());
    let v1 = middleware::session::apply(v1, state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}
