//! HTTP surface for the session and access-control service.
//!
//! Route handlers stay generic over the persistence traits so the same
//! application wiring serves both the MySQL-backed binary and the
//! in-memory integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::AppState;
