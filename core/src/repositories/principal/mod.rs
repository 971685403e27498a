//! Principal repository: read access to registered identities.

mod mock;
mod r#trait;

pub use mock::MockPrincipalRepository;
pub use r#trait::PrincipalRepository;
