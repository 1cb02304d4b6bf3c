/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config load -> authorizer build -> Router assembly
 * - HTTP middleware, axum::serve() with graceful shutdown
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::http::{self, HttpPolicy};
use crate::services::auth::build_authorizer;
use crate::state::AppState;
use crate::{api, config::AppEnv};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,request_authorizer=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(app_env: AppEnv) {
    let default_hook = panic::take_hook();
    let abort_on_panic = !app_env.is_production();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they are not lost with stderr.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().map_err(AppError::from)?;
    init_panic_hook(config.app_env);

    tracing::info!(
        app_env = ?config.app_env,
        trust_model = ?config.trust_model,
        addr = %config.addr,
        "starting request authorizer"
    );

    let state = build_state(&config)?;
    let app = http::apply(build_router(state), HttpPolicy::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let authorizer = build_authorizer(config)?;
    Ok(AppState::new(authorizer))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
