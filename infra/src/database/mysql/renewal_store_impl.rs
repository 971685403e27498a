//! MySQL implementation of the `RenewalStore` trait.
//!
//! Two tables back a principal's renewal sequence:
//!
//! ```sql
//! CREATE TABLE renewal_sequences (
//!     principal_id CHAR(36) PRIMARY KEY,
//!     version      BIGINT UNSIGNED NOT NULL
//! );
//!
//! CREATE TABLE renewal_records (
//!     seq          BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
//!     id           CHAR(36) NOT NULL,
//!     principal_id CHAR(36) NOT NULL,
//!     token_hash   VARCHAR(64) NOT NULL,
//!     issued_at    DATETIME(6) NOT NULL,
//!     INDEX idx_renewal_records_principal (principal_id),
//!     INDEX idx_renewal_records_hash (token_hash)
//! );
//! ```
//!
//! `renewal_sequences.version` moves on every write to a principal's
//! sequence. `compare_and_replace` runs inside a transaction whose version
//! update is conditional on the caller's expected version; zero affected
//! rows means another writer got there first and the whole replacement
//! rolls back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use stile_core::domain::entities::token::RenewalRecord;
use stile_core::errors::PersistenceError;
use stile_core::repositories::{RenewalStore, ReplaceOutcome, VersionedRecords};

/// MySQL implementation of `RenewalStore`
pub struct MySqlRenewalStore {
    pool: MySqlPool,
}

impl MySqlRenewalStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RenewalRecord, PersistenceError> {
        let id: String = row.try_get("id").map_err(query_err)?;
        Ok(RenewalRecord {
            id: Uuid::parse_str(&id).map_err(|e| PersistenceError::Query {
                message: format!("Invalid record UUID: {}", e),
            })?,
            token_hash: row.try_get("token_hash").map_err(query_err)?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(query_err)?,
        })
    }
}

#[async_trait]
impl RenewalStore for MySqlRenewalStore {
    async fn append(
        &self,
        principal_id: Uuid,
        record: RenewalRecord,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO renewal_sequences (principal_id, version)
            VALUES (?, 1)
            ON DUPLICATE KEY UPDATE version = version + 1
            "#,
        )
        .bind(principal_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO renewal_records (id, principal_id, token_hash, issued_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(principal_id.to_string())
        .bind(&record.token_hash)
        .bind(record.issued_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)
    }

    async fn load(&self, principal_id: Uuid) -> Result<VersionedRecords, PersistenceError> {
        let version_row = sqlx::query(
            "SELECT version FROM renewal_sequences WHERE principal_id = ? LIMIT 1",
        )
        .bind(principal_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        let version: u64 = match version_row {
            Some(row) => row.try_get("version").map_err(query_err)?,
            // An unknown principal reads as an empty sequence at version 0
            None => return Ok(VersionedRecords::default()),
        };

        let rows = sqlx::query(
            r#"
            SELECT id, token_hash, issued_at
            FROM renewal_records
            WHERE principal_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(principal_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VersionedRecords { records, version })
    }

    async fn compare_and_replace(
        &self,
        principal_id: Uuid,
        expected_version: u64,
        records: Vec<RenewalRecord>,
    ) -> Result<ReplaceOutcome, PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        if expected_version == 0 {
            // No sequence row yet: creating it is the version check. A
            // duplicate key here means a concurrent writer created it first.
            let inserted = sqlx::query(
                "INSERT INTO renewal_sequences (principal_id, version) VALUES (?, 1)",
            )
            .bind(principal_id.to_string())
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => {}
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    return Ok(ReplaceOutcome::Conflict);
                }
                Err(e) => return Err(storage_err(e)),
            }
        } else {
            let updated = sqlx::query(
                r#"
                UPDATE renewal_sequences
                SET version = version + 1
                WHERE principal_id = ? AND version = ?
                "#,
            )
            .bind(principal_id.to_string())
            .bind(expected_version)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

            if updated.rows_affected() == 0 {
                // Another writer moved the version; the transaction rolls
                // back on drop.
                return Ok(ReplaceOutcome::Conflict);
            }
        }

        sqlx::query("DELETE FROM renewal_records WHERE principal_id = ?")
            .bind(principal_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO renewal_records (id, principal_id, token_hash, issued_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(record.id.to_string())
            .bind(principal_id.to_string())
            .bind(&record.token_hash)
            .bind(record.issued_at)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(ReplaceOutcome::Applied)
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Uuid, RenewalRecord)>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT id, principal_id, token_hash, issued_at
            FROM renewal_records
            WHERE token_hash = ?
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match row {
            Some(row) => {
                let principal: String = row.try_get("principal_id").map_err(query_err)?;
                let principal_id =
                    Uuid::parse_str(&principal).map_err(|e| PersistenceError::Query {
                        message: format!("Invalid principal UUID: {}", e),
                    })?;
                Ok(Some((principal_id, Self::row_to_record(&row)?)))
            }
            None => Ok(None),
        }
    }

    async fn clear(&self, principal_id: Uuid) -> Result<usize, PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let deleted = sqlx::query("DELETE FROM renewal_records WHERE principal_id = ?")
            .bind(principal_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        // The version still moves so a stale conditional write cannot land
        // on the emptied sequence.
        sqlx::query(
            "UPDATE renewal_sequences SET version = version + 1 WHERE principal_id = ?",
        )
        .bind(principal_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(deleted.rows_affected() as usize)
    }

    async fn principals_with_records(&self) -> Result<Vec<Uuid>, PersistenceError> {
        let rows = sqlx::query("SELECT DISTINCT principal_id FROM renewal_records")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("principal_id").map_err(query_err)?;
                Uuid::parse_str(&id).map_err(|e| PersistenceError::Query {
                    message: format!("Invalid principal UUID: {}", e),
                })
            })
            .collect()
    }
}

/// Maps connectivity failures to `Connection` and everything else to `Query`.
fn storage_err(e: sqlx::Error) -> PersistenceError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PersistenceError::Connection {
                message: e.to_string(),
            }
        }
        other => PersistenceError::Query {
            message: other.to_string(),
        },
    }
}

fn query_err(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Query {
        message: e.to_string(),
    }
}
