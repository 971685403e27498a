//! Application state and route wiring.
//!
//! Everything is generic over the persistence traits: the production
//! binary plugs in the MySQL implementations, the integration tests plug
//! in the in-memory ones, and the wiring below is identical for both.

use std::sync::Arc;

use actix_web::web;

use stile_core::config::TokenConfig;
use stile_core::domain::entities::principal::Role;
use stile_core::errors::CoreResult;
use stile_core::repositories::{PrincipalRepository, RenewalStore};
use stile_core::services::{
    AuthorizationPolicy, PresenceTracker, RoleSet, TokenIssuer, TokenVerifier,
};

use crate::middleware::{AccessVerifier, RequireAuth, RequireRoles};
use crate::routes;

/// Shared application state
pub struct AppState<S: RenewalStore, P: PrincipalRepository> {
    pub issuer: TokenIssuer<S>,
    pub verifier: Arc<TokenVerifier<P>>,
    pub presence: Arc<PresenceTracker>,
    pub principals: Arc<P>,
}

impl<S, P> AppState<S, P>
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    /// Builds the state from the two persistence handles. Fails only on a
    /// bad signing configuration, which is fatal to startup.
    pub fn new(store: Arc<S>, principals: Arc<P>, config: TokenConfig) -> CoreResult<Self> {
        Ok(Self {
            issuer: TokenIssuer::new(store, config.clone())?,
            verifier: Arc::new(TokenVerifier::new(principals.clone(), &config)?),
            presence: Arc::new(PresenceTracker::new()),
            principals,
        })
    }
}

/// Role requirements for every guarded action, frozen at composition
/// time. Route wiring derives its guards from here so the policy and
/// the scopes cannot drift apart.
pub fn access_policy() -> AuthorizationPolicy {
    AuthorizationPolicy::builder()
        .action("presence.snapshot", RoleSet::of(&[Role::Admin]))
        .build()
}

/// Registers all API routes under /api/v1.
///
/// Login and refresh are reachable without a credential; logout and the
/// admin presence snapshot sit behind the authentication middleware. The
/// presence stream authenticates inside the handler so a rejected
/// handshake can be answered before any stream state is created.
pub fn configure<S, P>(
    verifier: Arc<dyn AccessVerifier>,
) -> impl FnOnce(&mut web::ServiceConfig)
where
    S: RenewalStore + 'static,
    P: PrincipalRepository + 'static,
{
    move |cfg| {
        let policy = access_policy();
        // An unregistered action falls back to the empty set, which
        // forbids everyone.
        let snapshot_roles = policy
            .required_for("presence.snapshot")
            .cloned()
            .unwrap_or_default();

        cfg.service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(routes::auth::login::login::<S, P>))
                        .route(
                            "/refresh",
                            web::post().to(routes::auth::refresh::refresh::<S, P>),
                        )
                        .service(
                            web::scope("")
                                .wrap(RequireAuth::new(verifier.clone()))
                                .route(
                                    "/logout",
                                    web::post().to(routes::auth::logout::logout::<S, P>),
                                ),
                        ),
                )
                .service(
                    web::scope("/presence")
                        .route(
                            "/events",
                            web::get().to(routes::presence::events::<S, P>),
                        )
                        .service(
                            web::scope("")
                                .wrap(RequireRoles::new(snapshot_roles))
                                .wrap(RequireAuth::new(verifier))
                                .route("", web::get().to(routes::presence::snapshot::<S, P>)),
                        ),
                ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stile_core::domain::entities::principal::Principal;
    use stile_core::services::Decision;

    fn principal(role: Role) -> Principal {
        Principal::new("p@example.com".to_string(), role, "hash".to_string())
    }

    #[test]
    fn test_snapshot_action_admits_admins_only() {
        let policy = access_policy();

        assert_eq!(
            policy.check("presence.snapshot", Some(&principal(Role::Admin))),
            Decision::Allow
        );
        assert_eq!(
            policy.check("presence.snapshot", Some(&principal(Role::User))),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_snapshot_role_set_is_registered() {
        let roles = access_policy()
            .required_for("presence.snapshot")
            .cloned()
            .expect("snapshot action must be registered");

        assert!(roles.contains(Role::Admin));
        assert!(!roles.contains(Role::User));
    }
}
