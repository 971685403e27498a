//! Role guard middleware.
//!
//! Runs after authentication and checks the verified principal against a
//! role set fixed at composition time. A request that never passed
//! authentication carries no principal and is refused; the guard never
//! allows by default.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use stile_core::domain::entities::principal::Principal;
use stile_core::services::{authorize, RoleSet};

use crate::handlers::error::forbidden_response;

/// Role guard middleware factory
pub struct RequireRoles {
    required: RoleSet,
}

impl RequireRoles {
    pub fn new(required: RoleSet) -> Self {
        Self { required }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRoles
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRolesMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRolesMiddleware {
            service: Rc::new(service),
            required: self.required.clone(),
        }))
    }
}

/// Role guard middleware service
pub struct RequireRolesMiddleware<S> {
    service: Rc<S>,
    required: RoleSet,
}

impl<S, B> Service<ServiceRequest> for RequireRolesMiddleware<S>
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
        let required = self.required.clone();

        Box::pin(async move {
            let decision = {
                let extensions = req.extensions();
                authorize(&required, extensions.get::<Principal>())
            };

            if decision.is_allowed() {
                service
                    .call(req)
                    .await
                    .map(|res| res.map_into_left_body())
            } else {
                Ok(req.into_response(forbidden_response()).map_into_right_body())
            }
        })
    }
}
