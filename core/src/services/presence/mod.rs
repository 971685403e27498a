//! Real-time presence tied to authenticated identity.

mod tracker;

pub use tracker::{PresenceGuard, PresenceTracker};
