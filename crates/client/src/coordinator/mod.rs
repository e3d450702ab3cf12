//! Cache coordination for page requests.
//!
//! Implements the check-cache -> placeholder -> render -> store protocol on
//! top of the page store and the renderer. Concurrent requests for the same
//! URL are de-duplicated through the fetch-in-progress placeholder, not
//! through locks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use prerender_core::{CachedPage, Error, PageStore};

use crate::render::{RenderOptions, Renderer};
use crate::urls::canonicalize;

/// Staleness policy: the two independent trust windows.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// How long an in-progress fetch is trusted before being presumed
    /// crashed. Shorter than `cache_timeout`: an active fetch should
    /// complete quickly.
    pub fetch_timeout: Duration,

    /// How long completed content is trusted before re-rendering.
    pub cache_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { fetch_timeout: Duration::from_secs(60), cache_timeout: Duration::from_secs(15 * 60) }
    }
}

/// Result of handling a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rendered markup, from the cache or from a fresh render.
    Rendered(String),

    /// Another fetch for this URL is underway; the caller should retry later.
    InProgress,
}

/// Orchestrates cache lookups, placeholder writes, and renders.
pub struct CacheCoordinator {
    store: Arc<dyn PageStore>,
    renderer: Arc<dyn Renderer>,
    policy: CachePolicy,
    render_opts: RenderOptions,
}

impl CacheCoordinator {
    pub fn new(
        store: Arc<dyn PageStore>, renderer: Arc<dyn Renderer>, policy: CachePolicy, render_opts: RenderOptions,
    ) -> Self {
        Self { store, renderer, policy, render_opts }
    }

    /// Serve a URL from the cache, or render it.
    ///
    /// A fresh completed entry is returned as-is; a fresh in-progress entry
    /// yields [`Outcome::InProgress`] without blocking. Anything stale is
    /// deleted, replaced by a placeholder, and re-rendered.
    ///
    /// There is no compare-and-swap between the staleness check and the
    /// placeholder write, so two concurrent requests can both judge the same
    /// URL stale and both render it. The duplicate render is idempotent;
    /// placeholder de-duplication is best effort.
    ///
    /// On render failure the placeholder is left in progress and the error
    /// is surfaced; the expiry sweep (or the next request after the fetch
    /// timeout) reclaims it. No retries happen here; `InProgress` is itself
    /// the caller-retry signal.
    pub async fn handle(&self, raw_url: &str) -> Result<Outcome, Error> {
        let url = canonicalize(raw_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let existing = self.store.get(url.as_str()).await?;
        let now = Utc::now();

        if let Some(page) = existing {
            if !page.is_stale(now, self.policy.fetch_timeout, self.policy.cache_timeout) {
                if page.fetch_in_progress {
                    tracing::info!(url = %url, "fetch in progress, telling caller to retry");
                    return Ok(Outcome::InProgress);
                }
                if let Some(content) = page.content {
                    tracing::debug!(url = %url, "cache hit");
                    return Ok(Outcome::Rendered(content));
                }
            }

            tracing::info!(url = %url, "deleting stale page");
            self.store.delete(url.as_str()).await?;
        }

        // The placeholder must be durably stored before rendering starts so
        // the next impatient crawler request sees a fetch in progress.
        let placeholder = CachedPage::placeholder(url.as_str(), now);
        self.store.put(&placeholder).await?;

        tracing::info!(url = %url, "rendering");
        let rendered = match self.renderer.render(&url, &self.render_opts).await {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "render failed, placeholder left for the sweep");
                return Err(Error::RenderFailed(e.to_string()));
            }
        };

        let html = rendered.html;
        self.store.put(&placeholder.complete(html.clone())).await?;

        Ok(Outcome::Rendered(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderError, RenderedPage};
    use prerender_core::SqlitePageStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Scripted renderer: counts invocations, returns canned output.
    struct StubRenderer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubRenderer {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), fail: true }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Renderer for StubRenderer {
        async fn render(&self, url: &Url, _opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(RenderError::Navigation("connection refused".into()));
            }
            Ok(RenderedPage {
                html: format!("<html><body>render #{call} of {url}</body></html>"),
                final_url: url.clone(),
                render_time_ms: 1,
            })
        }
    }

    async fn coordinator(renderer: Arc<StubRenderer>) -> (CacheCoordinator, Arc<SqlitePageStore>) {
        let store = Arc::new(SqlitePageStore::open_in_memory().await.unwrap());
        let coordinator = CacheCoordinator::new(
            store.clone(),
            renderer,
            CachePolicy::default(),
            RenderOptions::default(),
        );
        (coordinator, store)
    }

    const URL: &str = "https://example.com/page";

    #[tokio::test]
    async fn test_first_request_renders_once_and_persists() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        let outcome = coordinator.handle(URL).await.unwrap();

        assert!(matches!(outcome, Outcome::Rendered(ref html) if html.contains("render #1")));
        assert_eq!(renderer.calls(), 1);

        let page = store.get("https://example.com/page").await.unwrap().unwrap();
        assert!(!page.fetch_in_progress);
        assert!(page.content.is_some_and(|c| !c.is_empty()));
    }

    #[tokio::test]
    async fn test_fresh_completed_entry_served_without_render() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        let cached = CachedPage::placeholder("https://example.com/page", Utc::now()).complete("<html>cached</html>".into());
        store.put(&cached).await.unwrap();

        let outcome = coordinator.handle(URL).await.unwrap();

        assert_eq!(outcome, Outcome::Rendered("<html>cached</html>".into()));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_fresh_in_progress_entry_returns_sentinel() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        store
            .put(&CachedPage::placeholder("https://example.com/page", Utc::now()))
            .await
            .unwrap();

        let outcome = coordinator.handle(URL).await.unwrap();

        assert_eq!(outcome, Outcome::InProgress);
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_completed_entry_refetched() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        let stale_date = Utc::now() - chrono::Duration::seconds(901);
        let stale = CachedPage::placeholder("https://example.com/page", stale_date).complete("<html>old</html>".into());
        store.put(&stale).await.unwrap();

        let outcome = coordinator.handle(URL).await.unwrap();

        assert!(matches!(outcome, Outcome::Rendered(ref html) if html.contains("render #1")));
        assert_eq!(renderer.calls(), 1);

        let page = store.get("https://example.com/page").await.unwrap().unwrap();
        assert!(!page.fetch_in_progress);
        assert!(page.content.is_some_and(|c| c.contains("render #1")));
    }

    #[tokio::test]
    async fn test_abandoned_placeholder_refetched_after_fetch_timeout() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        // 61s old: past the 60s in-progress trust window, far from the 900s
        // content window.
        let abandoned = CachedPage::placeholder("https://example.com/page", Utc::now() - chrono::Duration::seconds(61));
        store.put(&abandoned).await.unwrap();

        let outcome = coordinator.handle(URL).await.unwrap();

        assert!(matches!(outcome, Outcome::Rendered(_)));
        assert_eq!(renderer.calls(), 1);
    }

    #[tokio::test]
    async fn test_render_failure_surfaces_and_leaves_placeholder() {
        let renderer = Arc::new(StubRenderer::failing());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        let result = coordinator.handle(URL).await;

        assert!(matches!(result, Err(Error::RenderFailed(_))));
        assert_eq!(renderer.calls(), 1);

        let page = store.get("https://example.com/page").await.unwrap().unwrap();
        assert!(page.fetch_in_progress);
        assert!(page.content.is_none());
    }

    #[tokio::test]
    async fn test_repeat_request_uses_cache() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, _store) = coordinator(renderer.clone()).await;

        let first = coordinator.handle(URL).await.unwrap();
        let second = coordinator.handle(URL).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(renderer.calls(), 1, "second request must not re-render");
    }

    #[tokio::test]
    async fn test_equivalent_urls_share_one_entry() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        coordinator.handle("https://Example.com/page#frag").await.unwrap();
        coordinator.handle("  https://example.com/page  ").await.unwrap();

        assert_eq!(renderer.calls(), 1);
        assert_eq!(store.scan_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_without_store_write() {
        let renderer = Arc::new(StubRenderer::ok());
        let (coordinator, store) = coordinator(renderer.clone()).await;

        let result = coordinator.handle("file:///etc/passwd").await;

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert_eq!(renderer.calls(), 0);
        assert!(store.scan_all().await.unwrap().is_empty());
    }
}
