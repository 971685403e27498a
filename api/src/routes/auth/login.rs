//! Handler for POST /api/v1/auth/login
//!
//! Verifies the password against the stored bcrypt hash and issues a
//! fresh credential pair. The response never distinguishes an unknown
//! email from a wrong password.

use actix_web::{web, HttpResponse};
use tracing::warn;

use stile_core::errors::CoreError;
use stile_core::repositories::{PrincipalRepository, RenewalStore};

use crate::app::AppState;
use crate::dto::auth_dto::{LoginRequest, SessionResponse};
use crate::handlers::error::{error_response, invalid_credentials_response};

pub async fn login<S, P>(
    state: web::Data<AppState<S, P>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    let principal = match state.principals.find_by_email(&request.email).await {
        Ok(Some(principal)) => principal,
        Ok(None) => return invalid_credentials_response(),
        Err(e) => return error_response(&CoreError::from(e)),
    };

    let password_matches = match bcrypt::verify(&request.password, &principal.credential_hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("password verification failed to run: {}", e);
            return error_response(&CoreError::Internal {
                message: e.to_string(),
            });
        }
    };

    if !password_matches {
        return invalid_credentials_response();
    }

    match state.issuer.issue(&principal).await {
        Ok(session) => HttpResponse::Ok().json(SessionResponse::from(session)),
        Err(e) => error_response(&e),
    }
}
