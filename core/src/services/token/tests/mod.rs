//! Unit tests for the credential lifecycle services

mod issuer_tests;
mod verifier_tests;
