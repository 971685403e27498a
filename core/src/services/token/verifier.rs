//! Stateless validation of presented access credentials

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::config::TokenConfig;
use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{Claims, JWT_AUDIENCE, JWT_ISSUER};
use crate::errors::{AuthError, CoreError};
use crate::repositories::PrincipalRepository;

/// Validates a presented access credential and resolves its subject.
///
/// Verification is pure except for the one store read that confirms the
/// subject still exists (a deleted account may hold a still-valid
/// credential). The signature is checked before any claim value is trusted.
pub struct TokenVerifier<P: PrincipalRepository> {
    principals: Arc<P>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl<P: PrincipalRepository> TokenVerifier<P> {
    /// Creates a new verifier.
    ///
    /// # Errors
    ///
    /// `CoreError::SigningConfiguration` if no signing key is configured.
    pub fn new(principals: Arc<P>, config: &TokenConfig) -> Result<Self, CoreError> {
        if config.secret.is_empty() {
            return Err(CoreError::SigningConfiguration {
                message: "signing key is empty; set JWT_SECRET".to_string(),
            });
        }
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self {
            principals,
            decoding_key,
            validation,
        })
    }

    /// Verifies the value of a bearer-style authorization header.
    ///
    /// An absent header is `AuthError::Missing`; a header not shaped
    /// `Bearer <token>` is `AuthError::Malformed`.
    pub async fn verify_bearer(&self, header: Option<&str>) -> Result<Principal, CoreError> {
        let header = header.ok_or(CoreError::Auth(AuthError::Missing))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(CoreError::Auth(AuthError::Malformed))?;
        self.verify_token(token).await
    }

    /// Verifies a bare access credential and resolves the principal.
    pub async fn verify_token(&self, token: &str) -> Result<Principal, CoreError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    _ => AuthError::Malformed,
                }
            })?;

        let principal_id = token_data
            .claims
            .principal_id()
            .map_err(|_| AuthError::Malformed)?;

        self.principals
            .find_by_id(principal_id)
            .await?
            .ok_or(CoreError::Auth(AuthError::SubjectNotFound))
    }
}
