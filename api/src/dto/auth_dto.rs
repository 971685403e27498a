//! Data transfer objects for the session endpoints

use serde::{Deserialize, Serialize};

use stile_core::domain::entities::token::IssuedSession;

/// Request body for POST /api/v1/auth/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for POST /api/v1/auth/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub renewal_token: String,
}

/// Credentials returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub renewal_token: String,
    pub access_expires_in: i64,
    pub renewal_expires_in: i64,
}

impl From<IssuedSession> for SessionResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            access_token: session.access_token,
            renewal_token: session.renewal_token,
            access_expires_in: session.access_expires_in,
            renewal_expires_in: session.renewal_expires_in,
        }
    }
}

/// Response body for POST /api/v1/auth/logout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
    pub revoked: usize,
}
