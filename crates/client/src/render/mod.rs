//! Headless browser rendering.
//!
//! This module provides the renderer capability trait, its option and error
//! types, and a feature-gated implementation using chromiumoxide for headless
//! Chrome/Chromium browser control.

use std::time::Duration;
use thiserror::Error;
use url::Url;

#[cfg(feature = "render")]
mod headless;
mod settle;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;
pub use settle::SettlePolicy;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for page to load.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// Navigation landed somewhere other than the requested URL.
    /// Redirects are surfaced to the caller, never silently chased.
    #[error("redirected: {from} -> {to}")]
    Redirected { from: String, to: String },
}

/// Options for rendering a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Hard bound on navigation and load, in milliseconds (default: 12000).
    pub timeout_ms: u64,

    /// Post-load settle polling schedule.
    pub settle: SettlePolicy,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 12_000, settle: SettlePolicy::default(), viewport: (1280, 720) }
    }
}

impl RenderOptions {
    /// Hard render timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Serialized DOM markup.
    pub html: String,

    /// URL the page actually loaded from.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Renderer trait for headless browser page rendering.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render a URL to HTML via headless browser.
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}
