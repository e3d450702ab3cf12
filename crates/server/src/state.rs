//! Shared handler state.

use std::sync::Arc;

use prerender_client::{CacheCoordinator, ExpirySweeper};

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<CacheCoordinator>,
    pub sweeper: Arc<ExpirySweeper>,
    pub service_key: Arc<String>,
}
