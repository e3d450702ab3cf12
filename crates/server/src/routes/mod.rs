//! Route table for the gateway.

pub mod pages;
pub mod sweep;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the gateway router.
///
/// `/` serves cached or freshly rendered pages; `/cron/delpages` is the
/// periodic trigger for the expiry sweep, meant for an external scheduler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::serve_page))
        .route("/cron/delpages", get(sweep::run_sweep))
        .with_state(state)
}
