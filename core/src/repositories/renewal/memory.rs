//! In-memory implementation of RenewalStore.
//!
//! Used by tests and by compositions that run without a database. The map
//! is keyed by principal id; DashMap's entry locking serializes writers for
//! one principal without blocking writers for any other.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::entities::token::RenewalRecord;
use crate::errors::PersistenceError;

use super::r#trait::{RenewalStore, ReplaceOutcome, VersionedRecords};

/// In-memory renewal store
#[derive(Default)]
pub struct MemoryRenewalStore {
    sequences: DashMap<Uuid, VersionedRecords>,
}

impl MemoryRenewalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RenewalStore for MemoryRenewalStore {
    async fn append(
        &self,
        principal_id: Uuid,
        record: RenewalRecord,
    ) -> Result<(), PersistenceError> {
        let mut sequence = self.sequences.entry(principal_id).or_default();
        sequence.records.push(record);
        sequence.version += 1;
        Ok(())
    }

    async fn load(&self, principal_id: Uuid) -> Result<VersionedRecords, PersistenceError> {
        Ok(self
            .sequences
            .get(&principal_id)
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    async fn compare_and_replace(
        &self,
        principal_id: Uuid,
        expected_version: u64,
        records: Vec<RenewalRecord>,
    ) -> Result<ReplaceOutcome, PersistenceError> {
        match self.sequences.entry(principal_id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().version != expected_version {
                    return Ok(ReplaceOutcome::Conflict);
                }
                let sequence = occupied.get_mut();
                sequence.records = records;
                sequence.version += 1;
                Ok(ReplaceOutcome::Applied)
            }
            Entry::Vacant(vacant) => {
                if expected_version != 0 {
                    return Ok(ReplaceOutcome::Conflict);
                }
                vacant.insert(VersionedRecords {
                    records,
                    version: 1,
                });
                Ok(ReplaceOutcome::Applied)
            }
        }
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Uuid, RenewalRecord)>, PersistenceError> {
        for entry in self.sequences.iter() {
            if let Some(record) = entry.records.iter().find(|r| r.token_hash == token_hash) {
                return Ok(Some((*entry.key(), record.clone())));
            }
        }
        Ok(None)
    }

    async fn clear(&self, principal_id: Uuid) -> Result<usize, PersistenceError> {
        match self.sequences.entry(principal_id) {
            Entry::Occupied(mut occupied) => {
                let sequence = occupied.get_mut();
                let removed = sequence.records.len();
                sequence.records.clear();
                sequence.version += 1;
                Ok(removed)
            }
            Entry::Vacant(_) => Ok(0),
        }
    }

    async fn principals_with_records(&self) -> Result<Vec<Uuid>, PersistenceError> {
        Ok(self
            .sequences
            .iter()
            .filter(|entry| !entry.records.is_empty())
            .map(|entry| *entry.key())
            .collect())
    }
}
