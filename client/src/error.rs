//! Session gate errors

use thiserror::Error;

/// Errors surfaced by the session gate
#[derive(Debug, Error)]
pub enum GateError {
    /// Transport-level failure from the underlying HTTP client
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server refused the credential; the local session has been
    /// cleared and the expiry signal raised
    #[error("session expired")]
    SessionExpired,
}
