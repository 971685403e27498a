//! Credential lifecycle services
//!
//! This module handles all credential-related operations:
//! - signed access credential issuance and verification
//! - opaque renewal token generation and redemption
//! - scheduled pruning of renewal records down to the rotation invariant

mod cleanup;
mod issuer;
mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{PruneOutcome, PruneReport, RenewalPruneWorker};
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;

use sha2::{Digest, Sha256};

/// Hashes an opaque renewal token for storage and lookup
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
