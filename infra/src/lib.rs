//! # Infrastructure Layer
//!
//! Concrete implementations of the core persistence traits, backed by MySQL
//! through SQLx. The core crate stays free of any database dependency; this
//! crate adapts its `RenewalStore` and `PrincipalRepository` contracts to
//! real tables.

pub mod database;

pub use database::connection::{DatabaseConfig, DatabasePool};
pub use database::mysql::{MySqlPrincipalRepository, MySqlRenewalStore};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
