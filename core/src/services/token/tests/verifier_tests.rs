//! Unit tests for the token verifier

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::domain::entities::principal::{Principal, Role};
use crate::domain::entities::token::Claims;
use crate::errors::{AuthError, CoreError};
use crate::repositories::{MemoryRenewalStore, MockPrincipalRepository};
use crate::services::token::{TokenIssuer, TokenVerifier};

fn test_principal(role: Role) -> Principal {
    Principal::new("user@example.com".to_string(), role, "hash".to_string())
}

async fn issue_for(
    principal: &Principal,
    config: &TokenConfig,
) -> (String, Arc<MockPrincipalRepository>) {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = TokenIssuer::new(store, config.clone()).unwrap();
    let session = issuer.issue(principal).await.unwrap();

    let principals = Arc::new(MockPrincipalRepository::new());
    principals.insert(principal.clone()).await;

    (session.access_token, principals)
}

fn assert_auth_err(result: Result<Principal, CoreError>, expected: AuthError) {
    match result {
        Err(CoreError::Auth(e)) => assert_eq!(e, expected),
        other => panic!("expected {:?}, got {:?}", expected, other.map(|p| p.id)),
    }
}

#[tokio::test]
async fn test_verify_round_trip_returns_id_and_role() {
    let config = TokenConfig::default();
    let principal = test_principal(Role::Admin);
    let (access_token, principals) = issue_for(&principal, &config).await;

    let verifier = TokenVerifier::new(principals, &config).unwrap();
    let header = format!("Bearer {}", access_token);
    let verified = verifier.verify_bearer(Some(&header)).await.unwrap();

    assert_eq!(verified.id, principal.id);
    assert_eq!(verified.role, Role::Admin);
}

#[tokio::test]
async fn test_absent_credential_is_missing() {
    let config = TokenConfig::default();
    let principals = Arc::new(MockPrincipalRepository::new());
    let verifier = TokenVerifier::new(principals, &config).unwrap();

    assert_auth_err(verifier.verify_bearer(None).await, AuthError::Missing);
}

#[tokio::test]
async fn test_non_bearer_shaped_input_is_malformed() {
    let config = TokenConfig::default();
    let principals = Arc::new(MockPrincipalRepository::new());
    let verifier = TokenVerifier::new(principals, &config).unwrap();

    assert_auth_err(
        verifier.verify_bearer(Some("Basic dXNlcjpwYXNz")).await,
        AuthError::Malformed,
    );
    assert_auth_err(
        verifier.verify_token("not-a-jwt").await,
        AuthError::Malformed,
    );
}

#[tokio::test]
async fn test_expired_credential_is_rejected() {
    let config = TokenConfig::default();
    let principal = test_principal(Role::User);
    let principals = Arc::new(MockPrincipalRepository::new());
    principals.insert(principal.clone()).await;

    // Expired beyond the decoder's default leeway
    let mut claims = Claims::new_access_token(principal.id, principal.role, Duration::minutes(15));
    claims.exp = (Utc::now() - Duration::minutes(10)).timestamp();
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    let verifier = TokenVerifier::new(principals, &config).unwrap();
    assert_auth_err(verifier.verify_token(&token).await, AuthError::Expired);
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let config = TokenConfig::default();
    let principal = test_principal(Role::User);
    let (access_token, principals) = issue_for(&principal, &config).await;

    // Flip one character in the signature segment
    let (head, signature) = access_token.rsplit_once('.').unwrap();
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}", head, chars.iter().collect::<String>());
    assert_ne!(tampered, access_token);

    let verifier = TokenVerifier::new(principals, &config).unwrap();
    assert_auth_err(
        verifier.verify_token(&tampered).await,
        AuthError::InvalidSignature,
    );
}

#[tokio::test]
async fn test_deleted_subject_is_rejected() {
    let config = TokenConfig::default();
    let principal = test_principal(Role::User);
    let (access_token, principals) = issue_for(&principal, &config).await;

    // The account disappears while its credential is still valid
    principals.remove(principal.id).await;

    let verifier = TokenVerifier::new(principals, &config).unwrap();
    assert_auth_err(
        verifier.verify_token(&access_token).await,
        AuthError::SubjectNotFound,
    );
}

#[tokio::test]
async fn test_wrong_issuer_is_malformed() {
    let config = TokenConfig::default();
    let principal = test_principal(Role::User);
    let principals = Arc::new(MockPrincipalRepository::new());
    principals.insert(principal.clone()).await;

    let mut claims = Claims::new_access_token(principal.id, principal.role, Duration::minutes(15));
    claims.iss = "someone-else".to_string();
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    let verifier = TokenVerifier::new(principals, &config).unwrap();
    assert_auth_err(verifier.verify_token(&token).await, AuthError::Malformed);
}

#[tokio::test]
async fn test_empty_signing_key_is_fatal_at_construction() {
    let principals = Arc::new(MockPrincipalRepository::new());
    let result = TokenVerifier::new(principals, &TokenConfig::new(""));

    assert!(matches!(
        result,
        Err(CoreError::SigningConfiguration { .. })
    ));
}

#[tokio::test]
async fn test_subject_not_found_for_unknown_id() {
    let config = TokenConfig::default();
    let principals = Arc::new(MockPrincipalRepository::new());
    let verifier = TokenVerifier::new(principals.clone(), &config).unwrap();

    let claims = Claims::new_access_token(Uuid::new_v4(), Role::User, Duration::minutes(15));
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    assert_auth_err(
        verifier.verify_token(&token).await,
        AuthError::SubjectNotFound,
    );
}
