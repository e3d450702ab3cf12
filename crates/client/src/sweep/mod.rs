//! Periodic expiry sweep over the page store.
//!
//! Runs as a batch job triggered by an external scheduler, never inline with
//! page requests. Reclaims both genuinely stale completed entries and
//! placeholders abandoned by crashed or failed fetches that no request
//! happened to revisit.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use prerender_core::{CachedPage, Error, PageStore};

/// Deletions are issued in batches of this size.
const DELETE_BATCH: usize = 100;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Number of pages examined.
    pub scanned: usize,

    /// Number of pages deleted.
    pub deleted: u64,
}

/// Batch job that evicts pages past the cache timeout.
pub struct ExpirySweeper {
    store: Arc<dyn PageStore>,
    cache_timeout: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn PageStore>, cache_timeout: Duration) -> Self {
        Self { store, cache_timeout }
    }

    /// Scan the store and delete every page whose fetch date is past the
    /// cache timeout, in progress or not.
    ///
    /// The in-progress flag is deliberately ignored: a placeholder that old
    /// belongs to a fetch that died long ago. A failed batch delete is
    /// logged and the sweep continues with the remaining batches.
    pub async fn sweep(&self) -> Result<SweepStats, Error> {
        let pages = self.store.scan_all().await?;
        let now = Utc::now();
        let scanned = pages.len();

        let expired: Vec<String> = pages
            .into_iter()
            .filter(|page| self.expired(page, now))
            .map(|page| page.url)
            .collect();

        let mut deleted = 0u64;
        for batch in expired.chunks(DELETE_BATCH) {
            match self.store.delete_all(batch).await {
                Ok(count) => deleted += count,
                Err(e) => {
                    tracing::warn!(batch = batch.len(), error = %e, "sweep batch delete failed, continuing");
                }
            }
        }

        tracing::info!(scanned, deleted, "expiry sweep complete");

        Ok(SweepStats { scanned, deleted })
    }

    fn expired(&self, page: &CachedPage, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.cache_timeout) {
            Ok(limit) => now.signed_duration_since(page.fetch_date) > limit,
            Err(_) => false,
        }
    }
}
