//! Specific error families for authentication, persistence, and the
//! presence handshake.
//!
//! Credential and role errors are never swallowed; they always surface as a
//! typed outcome at the boundary. Persistence conflicts during cleanup are
//! recoverable and deferred to the next scheduled pass.

use thiserror::Error;

/// Authentication failures for a presented access credential.
///
/// Every variant results in a rejected request and, on the client side, a
/// cleared session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented
    #[error("missing credential")]
    Missing,

    /// The presented value was not a well-formed bearer credential
    #[error("malformed credential")]
    Malformed,

    /// The credential's signature was valid but its lifetime has passed
    #[error("credential expired")]
    Expired,

    /// Signature verification failed; no claim value can be trusted
    #[error("invalid credential signature")]
    InvalidSignature,

    /// The subject no longer exists (deleted account with a live credential)
    #[error("credential subject not found")]
    SubjectNotFound,
}

/// Persistence-layer failures
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The store is unreachable. Fatal to a cleanup pass as a whole.
    #[error("store connection failure: {message}")]
    Connection { message: String },

    /// A single read or write failed; recoverable per principal.
    #[error("store query failure: {message}")]
    Query { message: String },
}

/// Presence-channel handshake failures. The connection is closed with no
/// registration and no server-side retry.
#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("handshake rejected: {0}")]
    Rejected(#[from] AuthError),
}
