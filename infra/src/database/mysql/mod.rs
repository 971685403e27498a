//! MySQL implementations of the core persistence traits

pub mod principal_repository_impl;
pub mod renewal_store_impl;

pub use principal_repository_impl::MySqlPrincipalRepository;
pub use renewal_store_impl::MySqlRenewalStore;
