//! Repository interfaces: the persistence boundary of the core.

pub mod principal;
pub mod renewal;

pub use principal::{MockPrincipalRepository, PrincipalRepository};
pub use renewal::{MemoryRenewalStore, RenewalStore, ReplaceOutcome, VersionedRecords};
