//! MySQL implementation of the `PrincipalRepository` trait.
//!
//! Backing table:
//!
//! ```sql
//! CREATE TABLE principals (
//!     id              CHAR(36) PRIMARY KEY,
//!     email           VARCHAR(255) NOT NULL UNIQUE,
//!     role            VARCHAR(16) NOT NULL,
//!     credential_hash VARCHAR(255) NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use stile_core::domain::entities::principal::{Principal, Role};
use stile_core::errors::PersistenceError;
use stile_core::repositories::PrincipalRepository;

/// MySQL implementation of `PrincipalRepository`
pub struct MySqlPrincipalRepository {
    pool: MySqlPool,
}

impl MySqlPrincipalRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_principal(row: &sqlx::mysql::MySqlRow) -> Result<Principal, PersistenceError> {
        let id: String = row.try_get("id").map_err(query_err)?;
        let role: String = row.try_get("role").map_err(query_err)?;

        Ok(Principal {
            id: Uuid::parse_str(&id).map_err(|e| PersistenceError::Query {
                message: format!("Invalid principal UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(query_err)?,
            role: Role::parse(&role).ok_or_else(|| PersistenceError::Query {
                message: format!("Unknown role: {}", role),
            })?,
            credential_hash: row.try_get("credential_hash").map_err(query_err)?,
        })
    }
}

#[async_trait]
impl PrincipalRepository for MySqlPrincipalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, credential_hash
            FROM principals
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, role, credential_hash
            FROM principals
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }
}

fn query_err(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Query {
        message: e.to_string(),
    }
}
