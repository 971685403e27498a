//! Access credential and renewal token issuance

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::Rng;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{Claims, IssuedSession, RenewalRecord};
use crate::errors::{AuthError, CoreError};
use crate::repositories::RenewalStore;

use super::hash_token;

/// Mints signed short-lived access credentials and persisted renewal
/// records for a principal.
pub struct TokenIssuer<S: RenewalStore> {
    store: Arc<S>,
    config: TokenConfig,
    encoding_key: EncodingKey,
}

impl<S: RenewalStore> TokenIssuer<S> {
    /// Creates a new issuer.
    ///
    /// # Errors
    ///
    /// `CoreError::SigningConfiguration` if no signing key is configured.
    /// This is a startup-time concern and should be treated as fatal.
    pub fn new(store: Arc<S>, config: TokenConfig) -> Result<Self, CoreError> {
        if config.secret.is_empty() {
            return Err(CoreError::SigningConfiguration {
                message: "signing key is empty; set JWT_SECRET".to_string(),
            });
        }
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            store,
            config,
            encoding_key,
        })
    }

    /// Issues a new session for the principal: a signed access credential
    /// plus an opaque renewal token whose record is appended to the
    /// principal's sequence. Appends never overwrite existing records; the
    /// prune worker enforces the rotation invariant later.
    pub async fn issue(&self, principal: &Principal) -> Result<IssuedSession, CoreError> {
        let claims = Claims::new_access_token(principal.id, principal.role, self.config.access_ttl());
        let access_token = self.encode_jwt(&claims)?;

        let renewal_token = generate_renewal_token();
        let record = RenewalRecord::new(hash_token(&renewal_token));
        self.store.append(principal.id, record).await?;

        Ok(IssuedSession {
            access_token,
            renewal_token,
            access_expires_in: self.config.access_ttl_secs,
            renewal_expires_in: self.config.renewal_window_secs,
        })
    }

    /// Redeems a presented renewal token, returning the owning principal's
    /// id when the token is known and still inside the validity window.
    pub async fn redeem(&self, presented: &str) -> Result<Uuid, CoreError> {
        let token_hash = hash_token(presented);

        let (principal_id, record) = self
            .store
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(CoreError::Auth(AuthError::Malformed))?;

        if !record.is_within_window(self.config.renewal_window(), Utc::now()) {
            return Err(CoreError::Auth(AuthError::Expired));
        }

        Ok(principal_id)
    }

    /// Removes every renewal record for the principal (explicit logout)
    pub async fn revoke_all(&self, principal_id: Uuid) -> Result<usize, CoreError> {
        Ok(self.store.clear(principal_id).await?)
    }

    fn encode_jwt(&self, claims: &Claims) -> Result<String, CoreError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key).map_err(|e| CoreError::Internal {
            message: format!("failed to encode access credential: {}", e),
        })
    }
}

/// Generates a random 32-character alphanumeric renewal token
fn generate_renewal_token() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| {
            let idx = rng.gen_range(0..62);
            match idx {
                0..10 => (b'0' + idx) as char,
                10..36 => (b'a' + idx - 10) as char,
                36..62 => (b'A' + idx - 36) as char,
                _ => unreachable!(),
            }
        })
        .collect()
}
