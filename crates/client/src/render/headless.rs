//! chromiumoxide-backed renderer.
//!
//! Each render launches a browser scoped to that request and closes it before
//! returning, so no engine state survives from one page to the next.

use std::time::Instant;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EventExceptionThrown;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use url::Url;

use super::{RenderError, RenderOptions, RenderedPage, Renderer, SettlePolicy};

/// Headless Chrome/Chromium renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderer;

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Renderer for HeadlessRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();

        let (mut browser, mut handler) = Browser::launch(
            BrowserConfig::builder()
                .window_size(opts.viewport.0, opts.viewport.1)
                // Scripts must run; images and remote fonts are dead weight
                // for a DOM snapshot.
                .args(vec!["--blink-settings=imagesEnabled=false", "--disable-remote-fonts"])
                .build()
                .map_err(RenderError::BrowserLaunch)?,
        )
        .await
        .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        let result = render_page(&browser, url, opts).await;

        // Release on both paths before surfacing the result.
        browser.close().await.ok();
        browser.wait().await.ok();
        events.abort();

        let mut rendered = result?;
        rendered.render_time_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(url = %url, ms = rendered.render_time_ms, bytes = rendered.html.len(), "rendered");

        Ok(rendered)
    }
}

async fn render_page(browser: &Browser, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
    let page = tokio::time::timeout(opts.timeout(), browser.new_page(url.as_str()))
        .await
        .map_err(|_| RenderError::Timeout(opts.timeout_ms))?
        .map_err(|e| RenderError::Navigation(e.to_string()))?;

    // Page script errors are logged, never allowed to abort the render. The
    // listener task ends with the browser when its event stream closes.
    if let Ok(mut exceptions) = page.event_listener::<EventExceptionThrown>().await {
        tokio::spawn(async move {
            while let Some(exception) = exceptions.next().await {
                tracing::debug!("page script error: {}", exception.exception_details.text);
            }
        });
    }

    tokio::time::timeout(opts.timeout(), page.wait_for_navigation())
        .await
        .map_err(|_| RenderError::Timeout(opts.timeout_ms))?
        .map_err(|e| RenderError::Navigation(e.to_string()))?;

    let landed = page
        .url()
        .await
        .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

    let final_url = Url::parse(landed.as_deref().unwrap_or(url.as_str()))
        .map_err(|e| RenderError::Navigation(e.to_string()))?;

    if final_url != *url {
        return Err(RenderError::Redirected { from: url.to_string(), to: final_url.to_string() });
    }

    let html = settle_content(&page, &opts.settle).await?;

    page.close().await.ok();

    Ok(RenderedPage { html, final_url, render_time_ms: 0 })
}

/// Poll the serialized DOM until it stops growing or the settle budget runs
/// out. CDP has no outstanding-script counter, so DOM stability between
/// polls stands in for "no background activity remains".
async fn settle_content(page: &Page, policy: &SettlePolicy) -> Result<String, RenderError> {
    let mut html = page
        .content()
        .await
        .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

    for (poll, delay) in policy.delays().into_iter().enumerate() {
        tokio::time::sleep(delay).await;

        let next = page
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        if next.len() == html.len() {
            tracing::debug!(poll = poll + 1, "background activity settled");
            return Ok(next);
        }

        html = next;
    }

    tracing::debug!("settle budget exhausted, serving current DOM");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Chrome/Chromium installation and network"]
    async fn test_render_simple_page() {
        let renderer = HeadlessRenderer::new();
        let url = Url::parse("https://example.com/").unwrap();
        let opts = RenderOptions::default();

        let rendered = renderer.render(&url, &opts).await.unwrap();
        assert!(rendered.html.contains("<html"));
        assert_eq!(rendered.final_url.as_str(), "https://example.com/");
    }

    #[tokio::test]
    #[ignore = "requires Chrome/Chromium installation and network"]
    async fn test_render_surfaces_redirect() {
        let renderer = HeadlessRenderer::new();
        // This host 301s to the www form.
        let url = Url::parse("http://github.com/").unwrap();
        let opts = RenderOptions::default();

        let result = renderer.render(&url, &opts).await;
        assert!(matches!(result, Err(RenderError::Redirected { .. })));
    }
}
