//! One-shot renewal prune pass, suitable for cron.
//!
//! Exits 0 when the pass ran (individual principal failures and deferred
//! conflicts are logged and retried on the next run) and 1 when the store
//! could not be enumerated at all.

use std::process::ExitCode;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stile_core::config::{PruneConfig, TokenConfig};
use stile_core::services::RenewalPruneWorker;
use stile_infra::{DatabaseConfig, DatabasePool, MySqlRenewalStore};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let token_config = TokenConfig::from_env();

    let db = match DatabasePool::new(DatabaseConfig::from_env()).await {
        Ok(db) => db,
        Err(e) => {
            error!("could not connect to the database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(MySqlRenewalStore::new(db.get_pool().clone()));
    let worker = RenewalPruneWorker::new(store, &token_config, PruneConfig::default());

    match worker.run_pass().await {
        Ok(report) => {
            info!(
                records_removed = report.records_removed,
                principals_written = report.principals_written,
                unchanged = report.unchanged,
                conflicts_deferred = report.conflicts_deferred,
                failures = report.errors.len(),
                "prune pass finished"
            );
            for failure in &report.errors {
                warn!("principal skipped: {}", failure);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("prune pass failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
