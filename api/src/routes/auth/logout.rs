//! Handler for POST /api/v1/auth/logout
//!
//! Clears every renewal record for the authenticated principal. The
//! current access credential stays valid until its short expiry; only
//! renewal is cut off.

use actix_web::{web, HttpResponse};
use tracing::info;

use stile_core::repositories::{PrincipalRepository, RenewalStore};

use crate::app::AppState;
use crate::dto::auth_dto::LogoutResponse;
use crate::handlers::error::error_response;
use crate::middleware::AuthContext;

pub async fn logout<S, P>(
    state: web::Data<AppState<S, P>>,
    context: AuthContext,
) -> HttpResponse
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    match state.issuer.revoke_all(context.principal_id).await {
        Ok(revoked) => {
            info!(principal_id = %context.principal_id, revoked, "session revoked");
            HttpResponse::Ok().json(LogoutResponse {
                message: "Logged out".to_string(),
                revoked,
            })
        }
        Err(e) => error_response(&e),
    }
}
