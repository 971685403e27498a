//! Client-side session gate.
//!
//! Wraps an HTTP client so every outbound request carries the current
//! credentials, and turns server-side session loss (401 responses) into a
//! single coalesced signal the application can react to.

pub mod config;
pub mod error;
pub mod gate;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::SessionGate;
