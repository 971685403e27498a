//! Business services: credential lifecycle, authorization, presence.

pub mod authz;
pub mod presence;
pub mod token;

// Re-export commonly used types
pub use authz::{authorize, AuthorizationPolicy, Decision, RoleSet};
pub use presence::{PresenceGuard, PresenceTracker};
pub use token::{PruneReport, RenewalPruneWorker, TokenIssuer, TokenVerifier};
