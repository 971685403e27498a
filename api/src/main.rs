use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use dotenvy::dotenv;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use stile_api::app::{self, AppState};
use stile_api::middleware::{cors, AccessVerifier};
use stile_core::config::{PruneConfig, TokenConfig};
use stile_core::services::RenewalPruneWorker;
use stile_infra::{DatabaseConfig, DatabasePool, MySqlPrincipalRepository, MySqlRenewalStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Stile API server");

    let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("SERVER_PORT must be a valid port number");
    let bind_address = format!("{}:{}", server_host, server_port);

    let token_config = TokenConfig::from_env();
    let prune_config = PruneConfig::from_env();

    let db = DatabasePool::new(DatabaseConfig::from_env())
        .await
        .map_err(into_io_error)?;
    let store = Arc::new(MySqlRenewalStore::new(db.get_pool().clone()));
    let principals = Arc::new(MySqlPrincipalRepository::new(db.get_pool().clone()));

    let state = AppState::new(store.clone(), principals, token_config.clone())
        .map_err(into_io_error)?;
    let verifier: Arc<dyn AccessVerifier> = state.verifier.clone();
    let state = web::Data::new(state);

    // Scheduled retirement of superseded and expired renewal records
    Arc::new(RenewalPruneWorker::new(store, &token_config, prune_config))
        .start_background_task();

    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors::create_cors())
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .configure(app::configure::<MySqlRenewalStore, MySqlPrincipalRepository>(
                verifier.clone(),
            ))
            .default_service(web::route().to(not_found))
    })
    .bind(&bind_address)?
    .run()
    .await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "stile-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found",
    }))
}

fn into_io_error<E: std::fmt::Display>(e: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
