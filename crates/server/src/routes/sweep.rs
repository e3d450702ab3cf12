//! Expiry sweep trigger.
//!
//! `GET /cron/delpages` runs one sweep pass and reports what it did.
//! Takes no parameters; wired to an external scheduler, not end users.

use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn run_sweep(State(state): State<AppState>) -> Result<String, ApiError> {
    let stats = state.sweeper.sweep().await?;
    Ok(format!("deleted {} of {} pages", stats.deleted, stats.scanned))
}

#[cfg(test)]
mod tests {
    use crate::routes::router;
    use crate::routes::testutil::{StubRenderer, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use prerender_core::{CachedPage, PageStore};
    use tower::ServiceExt;

    fn sweep_request() -> Request<Body> {
        Request::builder().uri("/cron/delpages").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_sweep_deletes_expired_only() {
        let (state, store) = test_state(StubRenderer::ok()).await;

        let old = Utc::now() - chrono::Duration::seconds(901);
        store
            .put(&CachedPage::placeholder("https://example.com/old", old).complete("<html/>".into()))
            .await
            .unwrap();
        store
            .put(&CachedPage::placeholder("https://example.com/stuck", old))
            .await
            .unwrap();
        store
            .put(&CachedPage::placeholder("https://example.com/new", Utc::now()).complete("<html/>".into()))
            .await
            .unwrap();

        let response = router(state).oneshot(sweep_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"deleted 2 of 3 pages");

        let remaining = store.scan_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].url, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_second_sweep_is_a_noop() {
        let (state, store) = test_state(StubRenderer::ok()).await;

        store
            .put(&CachedPage::placeholder(
                "https://example.com/old",
                Utc::now() - chrono::Duration::seconds(901),
            ))
            .await
            .unwrap();

        let app = router(state);
        app.clone().oneshot(sweep_request()).await.unwrap();
        let response = app.oneshot(sweep_request()).await.unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"deleted 0 of 0 pages");
    }
}
