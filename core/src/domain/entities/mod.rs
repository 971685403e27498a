//! Domain entities for the session and access-control core.

pub mod presence;
pub mod principal;
pub mod token;

pub use presence::{PresenceEntry, PresenceEvent, PresenceStatus};
pub use principal::{Principal, Role};
pub use token::{Claims, IssuedSession, RenewalRecord};
