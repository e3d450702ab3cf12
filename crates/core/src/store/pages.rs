//! Page CRUD operations.
//!
//! Implements the `PageStore` contract for the SQLite backend: single-page
//! reads and writes plus the bulk operations the expiry sweep needs.

use super::connection::SqlitePageStore;
use super::{CachedPage, PageStore};
use crate::Error;
use chrono::{DateTime, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

type PageRow = (String, Option<String>, String, i32);

fn page_from_row(row: PageRow) -> Result<CachedPage, Error> {
    let (url, content, fetch_date, fetch_in_progress) = row;
    let fetch_date = DateTime::parse_from_rfc3339(&fetch_date)
        .map_err(|e| Error::CorruptRecord(format!("{url}: bad fetch_date: {e}")))?
        .with_timezone(&Utc);

    Ok(CachedPage { url, content, fetch_date, fetch_in_progress: fetch_in_progress == 1 })
}

#[async_trait::async_trait]
impl PageStore for SqlitePageStore {
    /// Get the page for a URL.
    ///
    /// Returns None if the URL has never been stored.
    async fn get(&self, url: &str) -> Result<Option<CachedPage>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedPage>, Error> {
                let result = conn.query_row(
                    "SELECT url, content, fetch_date, fetch_in_progress FROM pages WHERE url = ?1",
                    params![url],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );

                match result {
                    Ok(row) => Ok(Some(page_from_row(row)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the page for its URL.
    ///
    /// Uses UPSERT semantics so completing a placeholder is the same write
    /// path as creating it.
    async fn put(&self, page: &CachedPage) -> Result<(), Error> {
        let page = page.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO pages (url, content, fetch_date, fetch_in_progress)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(url) DO UPDATE SET
                        content = excluded.content,
                        fetch_date = excluded.fetch_date,
                        fetch_in_progress = excluded.fetch_in_progress",
                    params![
                        &page.url,
                        &page.content,
                        page.fetch_date.to_rfc3339(),
                        page.fetch_in_progress as i32,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the page for a URL. Returns whether a row existed.
    async fn delete(&self, url: &str) -> Result<bool, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM pages WHERE url = ?1", params![url])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a batch of pages by URL.
    ///
    /// Returns the number of deleted entries.
    async fn delete_all(&self, urls: &[String]) -> Result<u64, Error> {
        if urls.is_empty() {
            return Ok(0);
        }

        let urls = urls.to_vec();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let placeholders = vec!["?"; urls.len()].join(", ");
                let sql = format!("DELETE FROM pages WHERE url IN ({placeholders})");
                let count = conn.execute(&sql, rusqlite::params_from_iter(urls.iter()))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Load every stored page, oldest fetch first.
    async fn scan_all(&self) -> Result<Vec<CachedPage>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<CachedPage>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, content, fetch_date, fetch_in_progress FROM pages ORDER BY fetch_date ASC",
                )?;

                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
                    .collect::<Result<Vec<PageRow>, _>>()?;

                rows.into_iter().map(page_from_row).collect()
            })
            .await
            .map_err(Error::from)
    }
}
