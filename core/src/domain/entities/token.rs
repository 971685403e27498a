//! Credential entities: JWT claims for access credentials and persisted
//! renewal records.
//!
//! Access credentials are ephemeral and never persisted; renewal records are
//! durable and carry no stored expiry. A record's expiry is always derived
//! from `issued_at` plus the configured validity window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Role;

/// Access credential expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Renewal record validity window (5 hours)
pub const RENEWAL_WINDOW_HOURS: i64 = 5;

/// JWT issuer
pub const JWT_ISSUER: &str = "stile";

/// JWT audience
pub const JWT_AUDIENCE: &str = "stile-api";

/// Claims structure for the signed access credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,

    /// Role of the subject at issuance time
    pub role: Role,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Unique identifier for this credential
    pub jti: String,
}

impl Claims {
    /// Creates claims for a new access credential
    pub fn new_access_token(principal_id: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiry = now + ttl;

        Self {
            sub: principal_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Checks if the claims are currently valid (after nbf, before exp)
    pub fn is_valid(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.nbf && now < self.exp
    }

    /// Gets the principal ID from the subject claim
    pub fn principal_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Persisted renewal record, one element of a principal's ordered sequence.
///
/// Insertion order equals issuance order. Expiry is derived, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// SHA-256 hash of the opaque renewal token
    pub token_hash: String,

    /// Timestamp when the renewal token was issued
    pub issued_at: DateTime<Utc>,
}

impl RenewalRecord {
    /// Creates a new renewal record issued now
    pub fn new(token_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            issued_at: Utc::now(),
        }
    }

    /// Creates a record with an explicit issuance time
    pub fn issued_at(token_hash: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            issued_at,
        }
    }

    /// Derived expiry: issuance time plus the validity window
    pub fn expires_at(&self, window: Duration) -> DateTime<Utc> {
        self.issued_at + window
    }

    /// Whether the record is still inside the validity window
    pub fn is_within_window(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.issued_at > now - window
    }
}

/// Credentials handed to the client after login or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedSession {
    /// Signed JWT access credential
    pub access_token: String,

    /// Opaque renewal token (the store holds only its hash)
    pub renewal_token: String,

    /// Access credential lifetime in seconds
    pub access_expires_in: i64,

    /// Renewal window in seconds
    pub renewal_expires_in: i64,
}
