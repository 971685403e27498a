//! Maps core errors to HTTP responses.
//!
//! Credential failures are 401 with a stable machine-readable code;
//! authorization refusals are 403; storage and configuration failures are
//! 500 and never leak internal detail to the client.

use actix_web::HttpResponse;
use serde_json::json;

use stile_core::errors::{AuthError, CoreError, HandshakeError};

/// Stable error code for each credential failure
fn auth_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::Missing => "missing_credential",
        AuthError::Malformed => "malformed_credential",
        AuthError::Expired => "expired_credential",
        AuthError::InvalidSignature => "invalid_signature",
        AuthError::SubjectNotFound => "unknown_subject",
    }
}

/// 401 response for a credential failure
pub fn auth_error_response(err: &AuthError) -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": auth_error_code(err),
        "message": err.to_string(),
    }))
}

/// 403 response for an authorization refusal
pub fn forbidden_response() -> HttpResponse {
    HttpResponse::Forbidden().json(json!({
        "error": "forbidden",
        "message": "Insufficient role for this action",
    }))
}

/// 401 response for a failed login. Deliberately does not distinguish an
/// unknown email from a wrong password.
pub fn invalid_credentials_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "error": "invalid_credentials",
        "message": "Email or password is incorrect",
    }))
}

/// Full mapping from a core error to an HTTP response
pub fn error_response(err: &CoreError) -> HttpResponse {
    match err {
        CoreError::Auth(auth) => auth_error_response(auth),
        CoreError::Handshake(HandshakeError::Rejected(auth)) => auth_error_response(auth),
        CoreError::Persistence(e) => {
            tracing::error!("storage failure: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "storage_error",
                "message": "The request could not be served",
            }))
        }
        other => {
            tracing::error!("internal failure: {}", other);
            HttpResponse::InternalServerError().json(json!({
                "error": "internal_error",
                "message": "The request could not be served",
            }))
        }
    }
}
