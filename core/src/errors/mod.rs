//! Error taxonomy for the session and access-control core.

mod types;

pub use types::{AuthError, HandshakeError, PersistenceError};

use thiserror::Error;

/// Top-level core errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// No usable signing key was configured. Raised at construction time
    /// and fatal to the process, never retried per call.
    #[error("signing configuration error: {message}")]
    SigningConfiguration { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    // Bridges to the specific error families
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

pub type CoreResult<T> = Result<T, CoreError>;
