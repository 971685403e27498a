//! Access credential middleware for protecting API endpoints.
//!
//! The middleware reads the Authorization header, verifies the signed
//! credential, and injects the verified principal into the request
//! extensions. Handlers downstream either take the principal from
//! extensions directly or use the `AuthContext` extractor.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use stile_core::domain::entities::principal::{Principal, Role};
use stile_core::errors::{AuthError, CoreResult};
use stile_core::repositories::PrincipalRepository;
use stile_core::services::TokenVerifier;

use crate::handlers::error::{auth_error_response, error_response};

/// Verifies a bearer credential and resolves it to a live principal.
///
/// Object-safe so the middleware can hold one verifier regardless of the
/// repository type behind it.
#[async_trait]
pub trait AccessVerifier: Send + Sync {
    async fn verify(&self, bearer: Option<&str>) -> CoreResult<Principal>;
}

#[async_trait]
impl<P: PrincipalRepository + 'static> AccessVerifier for TokenVerifier<P> {
    async fn verify(&self, bearer: Option<&str>) -> CoreResult<Principal> {
        self.verify_bearer(bearer).await
    }
}

/// Principal view injected into requests after verification
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal_id: Uuid,
    pub role: Role,
    pub email: String,
}

impl AuthContext {
    fn from_principal(principal: &Principal) -> Self {
        Self {
            principal_id: principal.id,
            role: principal.role,
            email: principal.email.clone(),
        }
    }
}

/// Authentication middleware factory
pub struct RequireAuth {
    verifier: Arc<dyn AccessVerifier>,
}

impl RequireAuth {
    pub fn new(verifier: Arc<dyn AccessVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

/// Authentication middleware service
pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessVerifier>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();

        Box::pin(async move {
            let header = bearer_header(&req);

            match verifier.verify(header.as_deref()).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    service
                        .call(req)
                        .await
                        .map(|res| res.map_into_left_body())
                }
                Err(err) => {
                    let response = error_response(&err);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Raw Authorization header value, if present and valid UTF-8
fn bearer_header(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .map(|s| s.to_string())
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Principal>()
            .map(AuthContext::from_principal)
            .ok_or_else(|| {
                actix_web::error::InternalError::from_response(
                    "authentication required",
                    auth_error_response(&AuthError::Missing),
                )
                .into()
            });

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_header_extraction() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer token_123"))
            .to_srv_request();
        assert_eq!(bearer_header(&req), Some("Bearer token_123".to_string()));

        let req_no_header = TestRequest::default().to_srv_request();
        assert_eq!(bearer_header(&req_no_header), None);
    }
}
