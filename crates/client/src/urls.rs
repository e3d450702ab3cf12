//! URL canonicalization for consistent cache keys.
//!
//! The page store is keyed by the canonical URL text, so every request must
//! normalize the same way before touching the store.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    NoHost,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string into the cache key form.
///
/// Requests arrive with a full absolute URL (crawlers pass the page they are
/// indexing), so unlike a search box there is no scheme to guess:
/// 1. Trim leading/trailing whitespace
/// 2. Require an absolute http/https URL with a host
/// 3. Remove fragment (#...), which never reaches the server being rendered
/// 4. Keep query string intact (do not reorder)
///
/// Host case and default ports are normalized by the parser.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::NoHost);
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
