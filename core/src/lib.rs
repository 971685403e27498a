//! # Stile Core
//!
//! Session and access-control core: credential issuance and verification,
//! renewal-record rotation with a scheduled pruning worker, role-based
//! authorization, and an in-memory presence map. This crate contains domain
//! entities, services, repository interfaces, and error types; transports
//! and database drivers live in the `stile_api` and `stile_infra` crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
