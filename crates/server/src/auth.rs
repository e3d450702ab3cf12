//! Shared-secret key validation.
//!
//! Every page request must carry the service key. The diagnostics are part
//! of the response contract and are returned verbatim in the 403 body.

use thiserror::Error;

/// Authentication failures, each carrying its response diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No service key attached to the request.")]
    MissingKey,

    #[error("The service key received does not match the desired key.")]
    KeyMismatch,
}

/// Validate the key supplied with a request.
///
/// `received` has already been percent-decoded exactly once by the query
/// layer; it must not be decoded again, or keys containing `%` or `+`
/// sequences stop matching.
pub fn validate_key(received: Option<&str>, expected: &str) -> Result<(), AuthError> {
    match received {
        None | Some("") => Err(AuthError::MissingKey),
        Some(key) if key != expected => Err(AuthError::KeyMismatch),
        Some(_) => Ok(()),
    }
}
