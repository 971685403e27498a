//! Unit tests for the token issuer

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::domain::entities::principal::{Principal, Role};
use crate::domain::entities::token::RenewalRecord;
use crate::errors::{AuthError, CoreError};
use crate::repositories::{MemoryRenewalStore, RenewalStore};
use crate::services::token::{hash_token, TokenIssuer};

fn test_principal() -> Principal {
    Principal::new("user@example.com".to_string(), Role::User, "hash".to_string())
}

fn test_issuer(store: Arc<MemoryRenewalStore>) -> TokenIssuer<MemoryRenewalStore> {
    TokenIssuer::new(store, TokenConfig::default()).expect("failed to create issuer")
}

#[tokio::test]
async fn test_issue_returns_both_credentials() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal = test_principal();

    let session = issuer.issue(&principal).await.unwrap();

    assert!(!session.access_token.is_empty());
    assert_eq!(session.renewal_token.len(), 32);
    assert_eq!(session.access_expires_in, 15 * 60);
    assert_eq!(session.renewal_expires_in, 5 * 3600);
}

#[tokio::test]
async fn test_issue_appends_hashed_renewal_record() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal = test_principal();

    let session = issuer.issue(&principal).await.unwrap();

    let sequence = store.load(principal.id).await.unwrap();
    assert_eq!(sequence.records.len(), 1);
    assert_eq!(
        sequence.records[0].token_hash,
        hash_token(&session.renewal_token)
    );
    // The raw token is never stored
    assert_ne!(sequence.records[0].token_hash, session.renewal_token);
}

#[tokio::test]
async fn test_repeated_issue_appends_never_overwrites() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal = test_principal();

    issuer.issue(&principal).await.unwrap();
    issuer.issue(&principal).await.unwrap();

    let sequence = store.load(principal.id).await.unwrap();
    assert_eq!(sequence.records.len(), 2);
}

#[tokio::test]
async fn test_empty_signing_key_is_fatal_at_construction() {
    let store = Arc::new(MemoryRenewalStore::new());
    let result = TokenIssuer::new(store, TokenConfig::new(""));

    assert!(matches!(
        result,
        Err(CoreError::SigningConfiguration { .. })
    ));
}

#[tokio::test]
async fn test_redeem_known_renewal_token() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal = test_principal();

    let session = issuer.issue(&principal).await.unwrap();
    let redeemed = issuer.redeem(&session.renewal_token).await.unwrap();

    assert_eq!(redeemed, principal.id);
}

#[tokio::test]
async fn test_redeem_unknown_token_is_rejected() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store);

    let result = issuer.redeem("no-such-token").await;
    assert!(matches!(result, Err(CoreError::Auth(AuthError::Malformed))));
}

#[tokio::test]
async fn test_redeem_outside_window_is_expired() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal_id = Uuid::new_v4();

    let stale = RenewalRecord::issued_at(
        hash_token("old-token"),
        Utc::now() - Duration::hours(6),
    );
    store.append(principal_id, stale).await.unwrap();

    let result = issuer.redeem("old-token").await;
    assert!(matches!(result, Err(CoreError::Auth(AuthError::Expired))));
}

#[tokio::test]
async fn test_revoke_all_clears_sequence() {
    let store = Arc::new(MemoryRenewalStore::new());
    let issuer = test_issuer(store.clone());
    let principal = test_principal();

    issuer.issue(&principal).await.unwrap();
    issuer.issue(&principal).await.unwrap();

    assert_eq!(issuer.revoke_all(principal.id).await.unwrap(), 2);
    assert!(store.load(principal.id).await.unwrap().records.is_empty());
}
