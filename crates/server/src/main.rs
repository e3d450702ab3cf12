//! prerender gateway entry point.
//!
//! Boots the HTTP gateway: loads configuration, opens the page store, wires
//! the coordinator and sweeper, and serves. Logging goes to stderr as JSON.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use prerender_client::{CacheCoordinator, CachePolicy, ExpirySweeper, HeadlessRenderer, RenderOptions, SettlePolicy};
use prerender_core::{AppConfig, SqlitePageStore};
use tracing_subscriber::EnvFilter;

mod auth;
mod error;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(db = %config.db_path.display(), "opening page store");
    let store = Arc::new(SqlitePageStore::open(&config.db_path).await?);

    let policy = CachePolicy { fetch_timeout: config.fetch_timeout(), cache_timeout: config.cache_timeout() };
    let render_opts = RenderOptions {
        timeout_ms: config.render_timeout_ms,
        settle: SettlePolicy {
            initial_delay: Duration::from_millis(config.settle_initial_delay_ms),
            max_delay: Duration::from_millis(config.settle_max_delay_ms),
            max_checks: config.settle_max_checks,
        },
        ..Default::default()
    };

    let coordinator = Arc::new(CacheCoordinator::new(
        store.clone(),
        Arc::new(HeadlessRenderer::new()),
        policy,
        render_opts,
    ));
    let sweeper = Arc::new(ExpirySweeper::new(store, config.cache_timeout()));

    let state = state::AppState { coordinator, sweeper, service_key: Arc::new(config.service_key.clone()) };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "prerender gateway listening");
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
