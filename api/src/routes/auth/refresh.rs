//! Handler for POST /api/v1/auth/refresh
//!
//! Redeems an opaque renewal token for a fresh credential pair. The new
//! renewal record is appended to the principal's sequence; the scheduled
//! prune worker retires the superseded ones.

use actix_web::{web, HttpResponse};

use stile_core::errors::{AuthError, CoreError};
use stile_core::repositories::{PrincipalRepository, RenewalStore};

use crate::app::AppState;
use crate::dto::auth_dto::{RefreshRequest, SessionResponse};
use crate::handlers::error::error_response;

pub async fn refresh<S, P>(
    state: web::Data<AppState<S, P>>,
    request: web::Json<RefreshRequest>,
) -> HttpResponse
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    let principal_id = match state.issuer.redeem(&request.renewal_token).await {
        Ok(id) => id,
        Err(e) => return error_response(&e),
    };

    let principal = match state.principals.find_by_id(principal_id).await {
        Ok(Some(principal)) => principal,
        Ok(None) => return error_response(&CoreError::Auth(AuthError::SubjectNotFound)),
        Err(e) => return error_response(&CoreError::from(e)),
    };

    match state.issuer.issue(&principal).await {
        Ok(session) => HttpResponse::Ok().json(SessionResponse::from(session)),
        Err(e) => error_response(&e),
    }
}
