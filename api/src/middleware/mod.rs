//! Request middleware: authentication, role guards, and CORS

pub mod auth;
pub mod cors;
pub mod roles;

pub use auth::{AccessVerifier, AuthContext, RequireAuth};
pub use roles::RequireRoles;
