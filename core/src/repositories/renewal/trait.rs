//! Renewal store trait defining the interface for renewal record persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RenewalRecord;
use crate::errors::PersistenceError;

/// A principal's renewal sequence together with its optimistic version.
///
/// The version changes on every write to the sequence. A writer that read
/// version N may only replace the sequence while it is still at version N.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedRecords {
    /// Records in issuance order (insertion order equals issuance order)
    pub records: Vec<RenewalRecord>,
    /// Optimistic concurrency token
    pub version: u64,
}

/// Outcome of a conditional replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The sequence was at the expected version and has been replaced
    Applied,
    /// Another writer got there first; nothing was changed
    Conflict,
}

/// Store trait for per-principal ordered renewal record sequences.
///
/// Mutations must be serialized per principal, never globally: concurrent
/// logins for different principals may not block each other. The
/// read-modify-write cycle used by the prune worker goes through
/// [`RenewalStore::load`] and [`RenewalStore::compare_and_replace`] so that
/// a record appended after the read is never silently dropped by the write.
///
/// # Example
/// ```no_run
/// # use uuid::Uuid;
/// # use stile_core::repositories::{RenewalStore, ReplaceOutcome};
/// # async fn example(store: &impl RenewalStore) -> Result<(), Box<dyn std::error::Error>> {
/// let principal_id = Uuid::new_v4();
/// let current = store.load(principal_id).await?;
/// let retained = current.records.last().cloned().into_iter().collect();
///
/// match store.compare_and_replace(principal_id, current.version, retained).await? {
///     ReplaceOutcome::Applied => println!("sequence pruned"),
///     ReplaceOutcome::Conflict => println!("raced with a login, reconciled next pass"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RenewalStore: Send + Sync {
    /// Append a record to the principal's sequence, bumping its version.
    /// Appends never overwrite existing records.
    async fn append(
        &self,
        principal_id: Uuid,
        record: RenewalRecord,
    ) -> Result<(), PersistenceError>;

    /// Load the principal's sequence with its current version. A principal
    /// with no records yields an empty sequence at version 0.
    async fn load(&self, principal_id: Uuid) -> Result<VersionedRecords, PersistenceError>;

    /// Replace the sequence only if it is still at `expected_version`.
    ///
    /// # Returns
    /// * `Ok(ReplaceOutcome::Applied)` - Replaced, version bumped
    /// * `Ok(ReplaceOutcome::Conflict)` - Version moved on; nothing written
    /// * `Err(PersistenceError)` - Store error occurred
    async fn compare_and_replace(
        &self,
        principal_id: Uuid,
        expected_version: u64,
        records: Vec<RenewalRecord>,
    ) -> Result<ReplaceOutcome, PersistenceError>;

    /// Find a record by the hash of its opaque token, returning the owning
    /// principal as well. Used by the refresh flow.
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Uuid, RenewalRecord)>, PersistenceError>;

    /// Remove every record for the principal (explicit logout).
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records removed
    async fn clear(&self, principal_id: Uuid) -> Result<usize, PersistenceError>;

    /// Enumerate principals that currently hold at least one record.
    /// This is the prune worker's entry point; failure here fails the pass.
    async fn principals_with_records(&self) -> Result<Vec<Uuid>, PersistenceError>;
}
