//! Persistent page store keyed by URL.
//!
//! This module provides the store for rendered pages using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - One record per URL with fetch-in-progress and fetch-date metadata
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Bulk deletion for the expiry sweep

pub mod connection;
pub mod migrations;
pub mod pages;

pub use crate::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use connection::SqlitePageStore;

/// A cached rendered page, the sole persisted entity.
///
/// Created as a placeholder before a render starts, completed in place once
/// the render succeeds, and deleted when superseded or swept as stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPage {
    /// Canonicalized URL, the unique key.
    pub url: String,

    /// Rendered HTML, present only once a fetch completes.
    pub content: Option<String>,

    /// When the current fetch attempt (placeholder or completed) was recorded.
    pub fetch_date: DateTime<Utc>,

    /// True from placeholder creation until content is saved.
    pub fetch_in_progress: bool,
}

impl CachedPage {
    /// Build a placeholder marking a fetch in progress.
    ///
    /// Stored before the render starts so concurrent requests observe an
    /// in-progress fetch instead of racing to render.
    pub fn placeholder(url: impl Into<String>, fetch_date: DateTime<Utc>) -> Self {
        Self { url: url.into(), content: None, fetch_date, fetch_in_progress: true }
    }

    /// Mark the fetch complete with its rendered content.
    ///
    /// Keeps `fetch_date` at placeholder-creation time; it is the basis for
    /// staleness, not a last-served stamp.
    pub fn complete(mut self, content: String) -> Self {
        self.content = Some(content);
        self.fetch_in_progress = false;
        self
    }

    /// Whether this page should be discarded and re-fetched.
    ///
    /// An in-progress fetch is trusted only for `fetch_timeout` (an active
    /// fetch should finish quickly); completed content is trusted for the
    /// longer `cache_timeout`. A completed record without content is stale.
    pub fn is_stale(&self, now: DateTime<Utc>, fetch_timeout: Duration, cache_timeout: Duration) -> bool {
        let age = now.signed_duration_since(self.fetch_date);
        let limit = if self.fetch_in_progress { fetch_timeout } else { cache_timeout };

        match chrono::Duration::from_std(limit) {
            Ok(limit) => age > limit || (!self.fetch_in_progress && self.content.is_none()),
            // A limit too large for chrono means the entry never ages out.
            Err(_) => !self.fetch_in_progress && self.content.is_none(),
        }
    }
}

/// Storage contract for cached pages.
///
/// Single-key operations are read-after-write consistent for the same key.
/// CacheCoordinator and ExpirySweeper only see this trait, so the backend
/// can be swapped without touching either.
#[async_trait::async_trait]
pub trait PageStore: Send + Sync {
    /// Load the page for a URL, if any.
    async fn get(&self, url: &str) -> Result<Option<CachedPage>, Error>;

    /// Insert or replace the page for its URL.
    async fn put(&self, page: &CachedPage) -> Result<(), Error>;

    /// Delete the page for a URL. Returns whether a row existed.
    async fn delete(&self, url: &str) -> Result<bool, Error>;

    /// Delete a batch of pages by URL. Returns the number deleted.
    async fn delete_all(&self, urls: &[String]) -> Result<u64, Error>;

    /// Load every stored page.
    async fn scan_all(&self) -> Result<Vec<CachedPage>, Error>;
}
