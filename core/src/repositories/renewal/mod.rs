//! Renewal record store: the durable persistence boundary for rotation.

mod memory;
mod r#trait;

pub use memory::MemoryRenewalStore;
pub use r#trait::{RenewalStore, ReplaceOutcome, VersionedRecords};
