//! Middleware behavior: credential rejection and role guarding.

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use stile_api::app::{configure, AppState};
use stile_api::middleware::AccessVerifier;
use stile_core::config::TokenConfig;
use stile_core::domain::entities::principal::{Principal, Role};
use stile_core::repositories::{MemoryRenewalStore, MockPrincipalRepository};

const PASSWORD: &str = "correct horse battery staple";

async fn seeded_state(
    role: Role,
) -> AppState<MemoryRenewalStore, MockPrincipalRepository> {
    let store = Arc::new(MemoryRenewalStore::new());
    let principals = Arc::new(MockPrincipalRepository::new());

    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    let principal = Principal::new("user@example.com".to_string(), role, hash);
    principals.insert(principal).await;

    AppState::new(store, principals, TokenConfig::default()).unwrap()
}

macro_rules! test_app {
    ($state:expr) => {{
        let verifier: Arc<dyn AccessVerifier> = $state.verifier.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure::<MemoryRenewalStore, MockPrincipalRepository>(
                    verifier,
                )),
        )
        .await
    }};
}

macro_rules! obtain_access_token {
    ($app:expr) => {{
        let resp = test::call_service(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": "user@example.com", "password": PASSWORD }))
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_garbage_credential_is_rejected() {
    let state = seeded_state(Role::User).await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "malformed_credential");
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_rejected() {
    let state = seeded_state(Role::User).await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_presence_snapshot_refuses_non_admin() {
    let state = seeded_state(Role::User).await;
    let app = test_app!(state);
    let access_token = obtain_access_token!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/presence")
            .insert_header(("Authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");
}

#[actix_web::test]
async fn test_presence_snapshot_allows_admin() {
    let state = seeded_state(Role::Admin).await;
    let app = test_app!(state);
    let access_token = obtain_access_token!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/presence")
            .insert_header(("Authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["online"], 0);
}

#[actix_web::test]
async fn test_presence_stream_rejects_missing_credential() {
    let state = seeded_state(Role::User).await;
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/presence/events")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_presence_stream_opens_for_valid_credential() {
    let state = seeded_state(Role::User).await;
    let app = test_app!(state);
    let access_token = obtain_access_token!(&app);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/presence/events")
            .insert_header(("Authorization", format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
}
