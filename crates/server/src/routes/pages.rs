//! Page request handler.
//!
//! `GET /?url=<target>&key=<secret>` validates the key, then serves the
//! rendered page from the cache coordinator as plain text. A fetch already
//! underway is reported with the `FETCH_IN_PROGRESS` sentinel so the caller
//! retries instead of waiting.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::auth::validate_key;
use crate::error::ApiError;
use crate::state::AppState;
use prerender_client::Outcome;

/// Response body signalling the caller should retry later.
pub const FETCH_IN_PROGRESS: &str = "FETCH_IN_PROGRESS";

/// Query parameters for a page request.
///
/// Values arrive percent-decoded once by the extractor.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub key: Option<String>,
}

pub async fn serve_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Result<Response, ApiError> {
    validate_key(query.key.as_deref(), &state.service_key)?;

    let url = query.url.unwrap_or_default();
    if url.is_empty() {
        // Valid key, no target: nothing to render.
        return Ok(StatusCode::OK.into_response());
    }

    match state.coordinator.handle(&url).await? {
        Outcome::Rendered(html) => Ok(html.into_response()),
        Outcome::InProgress => Ok(FETCH_IN_PROGRESS.into_response()),
    }
}
