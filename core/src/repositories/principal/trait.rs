//! Principal repository trait defining the interface for identity lookups.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::errors::PersistenceError;

/// Repository trait for Principal lookups.
///
/// The core only reads principals: the verifier resolves credential subjects
/// and the login flow resolves email addresses. Account management is a
/// separate concern outside this crate.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Find a principal by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(Principal))` - Principal found
    /// * `Ok(None)` - No principal with this id (e.g. a deleted account)
    /// * `Err(PersistenceError)` - Store error occurred
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, PersistenceError>;

    /// Find a principal by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, PersistenceError>;
}
