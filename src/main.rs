//! Squares Back binary entrypoint wiring REST, SSE, and score polling layers.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod feed;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::pool_store::memory::MemoryPoolStore;
use feed::espn::{DEFAULT_SCOREBOARD_URL, EspnScoreFeed};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let store = Arc::new(MemoryPoolStore::new());
    let scoreboard_url = config
        .scoreboard_url
        .as_deref()
        .unwrap_or(DEFAULT_SCOREBOARD_URL);
    let feed = EspnScoreFeed::new(scoreboard_url).context("building score feed client")?;
    let app_state = AppState::new(store, Arc::new(feed), config.admin_secret.clone());

    if config.poll_enabled {
        tokio::spawn(services::score_poller::run(
            app_state.clone(),
            config.poll_interval,
        ));
    } else {
        warn!("score polling disabled; scores only move via manual entry or forced fetches");
    }
    // The router takes its own handle on the shared state.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
