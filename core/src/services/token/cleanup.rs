//! Scheduled pruning of renewal records down to the rotation invariant
//!
//! After a pass, a principal's sequence holds at most one record: the most
//! recently issued one that was still inside the validity window at prune
//! time. The pass is decoupled from request traffic, idempotent, and safe
//! to interrupt between principals.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{PruneConfig, TokenConfig};
use crate::domain::entities::token::RenewalRecord;
use crate::errors::{CoreError, PersistenceError};
use crate::repositories::{RenewalStore, ReplaceOutcome};

/// Worker enforcing the one-active-renewal-record-per-principal invariant
pub struct RenewalPruneWorker<S: RenewalStore + 'static> {
    store: Arc<S>,
    window: Duration,
    config: PruneConfig,
}

/// Outcome of pruning a single principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// The sequence already satisfied the invariant; no write issued
    Unchanged,
    /// The sequence was rewritten, removing this many records
    Pruned { removed: usize },
    /// A concurrent writer moved the version; skipped until the next pass
    Conflict,
}

impl<S: RenewalStore> RenewalPruneWorker<S> {
    /// Creates a new prune worker. The validity window W comes from the
    /// token configuration so the worker and the issuer always agree.
    pub fn new(store: Arc<S>, token_config: &TokenConfig, config: PruneConfig) -> Self {
        Self {
            store,
            window: token_config.renewal_window(),
            config,
        }
    }

    /// Runs a single prune pass over every principal holding records.
    ///
    /// A failure to update one principal is logged and the pass continues;
    /// only the inability to enumerate principals fails the pass as a
    /// whole.
    pub async fn run_pass(&self) -> Result<PruneReport, CoreError> {
        info!("starting renewal prune pass");

        let principals = self.store.principals_with_records().await?;

        let mut report = PruneReport::default();
        for principal_id in principals {
            match self.prune_principal(principal_id).await {
                Ok(PruneOutcome::Unchanged) => report.unchanged += 1,
                Ok(PruneOutcome::Pruned { removed }) => {
                    report.principals_written += 1;
                    report.records_removed += removed;
                }
                Ok(PruneOutcome::Conflict) => {
                    warn!(%principal_id, "prune raced with a concurrent write, deferring to next pass");
                    report.conflicts_deferred += 1;
                }
                Err(e) => {
                    error!(%principal_id, error = %e, "failed to prune principal");
                    report.errors.push(format!("{}: {}", principal_id, e));
                }
            }
        }

        info!(
            removed = report.records_removed,
            written = report.principals_written,
            unchanged = report.unchanged,
            conflicts = report.conflicts_deferred,
            errors = report.errors.len(),
            "renewal prune pass completed"
        );

        Ok(report)
    }

    /// Prunes one principal's sequence via an optimistic read-modify-write.
    /// A record appended after the read makes the conditional write fail,
    /// so it can never be dropped by this pass.
    pub async fn prune_principal(
        &self,
        principal_id: Uuid,
    ) -> Result<PruneOutcome, PersistenceError> {
        let current = self.store.load(principal_id).await?;
        if current.records.is_empty() {
            return Ok(PruneOutcome::Unchanged);
        }

        let retained = Self::retain_latest(&current.records, self.window, Utc::now());

        let identical = retained.len() == current.records.len()
            && retained
                .iter()
                .zip(&current.records)
                .all(|(a, b)| a.id == b.id);
        if identical {
            return Ok(PruneOutcome::Unchanged);
        }

        let removed = current.records.len() - retained.len();
        match self
            .store
            .compare_and_replace(principal_id, current.version, retained)
            .await?
        {
            ReplaceOutcome::Applied => Ok(PruneOutcome::Pruned { removed }),
            ReplaceOutcome::Conflict => Ok(PruneOutcome::Conflict),
        }
    }

    /// The rotation policy: of the records still inside the validity
    /// window, keep only the most recently issued one. This discards older
    /// records even when they are still valid, which forbids concurrent
    /// renewal lineages per principal.
    fn retain_latest(
        records: &[RenewalRecord],
        window: Duration,
        now: DateTime<Utc>,
    ) -> Vec<RenewalRecord> {
        let mut latest: Option<&RenewalRecord> = None;
        for record in records {
            if !record.is_within_window(window, now) {
                continue;
            }
            match latest {
                Some(current) if current.issued_at > record.issued_at => {}
                _ => latest = Some(record),
            }
        }
        latest.cloned().into_iter().collect()
    }

    /// Starts the worker as a background task running at the configured
    /// interval.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("renewal prune worker is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "renewal prune worker started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_pass().await {
                    Ok(report) => {
                        if !report.is_success() {
                            warn!(errors = ?report.errors, "prune pass completed with errors");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "prune pass failed");
                    }
                }
            }
        });
    }
}

/// Summary of one prune pass
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Records removed across all principals
    pub records_removed: usize,
    /// Principals whose sequence was rewritten
    pub principals_written: usize,
    /// Principals already satisfying the invariant
    pub unchanged: usize,
    /// Principals skipped because of a version conflict
    pub conflicts_deferred: usize,
    /// Per-principal errors encountered during the pass
    pub errors: Vec<String>,
}

impl PruneReport {
    /// Whether the pass completed without per-principal errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
