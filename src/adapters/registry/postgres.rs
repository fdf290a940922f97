//! PostgreSQL implementation of ConnectionRegistry.
//!
//! One row per live connection in a table whose name comes from
//! configuration. Since the name is interpolated into SQL, it is checked to
//! be a plain identifier before any query is built.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ConnectionId, Timestamp, ValidationError};
use crate::domain::relay::ConnectionRecord;
use crate::ports::{ConnectionRegistry, RegistryError};

/// PostgreSQL connection registry.
#[derive(Clone)]
pub struct PostgresConnectionRegistry {
    pool: PgPool,
    table: String,
}

impl PostgresConnectionRegistry {
    /// Creates a registry over `table`, which must be a plain SQL identifier.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, ValidationError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }

    /// Creates the table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), RegistryError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                connection_id TEXT PRIMARY KEY,
                connected_at TIMESTAMPTZ NOT NULL
            )
            "#,
            self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("create registry table", e))?;
        Ok(())
    }
}

/// Accepts ASCII letters, digits and underscores, not starting with a digit.
pub fn validate_table_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if name.is_empty() {
        return Err(ValidationError::empty_field("table_name"));
    }
    if !valid_start || !valid_rest || name.len() > 63 {
        return Err(ValidationError::invalid_format(
            "table_name",
            "must be a plain SQL identifier of at most 63 characters",
        ));
    }
    Ok(())
}

fn db_error(action: &str, e: sqlx::Error) -> RegistryError {
    RegistryError::Unavailable(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl ConnectionRegistry for PostgresConnectionRegistry {
    async fn register(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        let sql = format!(
            r#"
            INSERT INTO "{}" (connection_id, connected_at)
            VALUES ($1, $2)
            ON CONFLICT (connection_id) DO UPDATE SET connected_at = EXCLUDED.connected_at
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(connection_id.as_str())
            .bind(*Timestamp::now().as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("register connection", e))?;
        Ok(())
    }

    async fn deregister(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        let sql = format!(r#"DELETE FROM "{}" WHERE connection_id = $1"#, self.table);
        sqlx::query(&sql)
            .bind(connection_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deregister connection", e))?;
        Ok(())
    }

    async fn contains(&self, connection_id: &ConnectionId) -> Result<bool, RegistryError> {
        let sql = format!(
            r#"SELECT EXISTS (SELECT 1 FROM "{}" WHERE connection_id = $1)"#,
            self.table
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(connection_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("look up connection", e))
    }

    async fn connections(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        let sql = format!(
            r#"SELECT connection_id, connected_at FROM "{}" ORDER BY connection_id"#,
            self.table
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list connections", e))?;

        rows.into_iter()
            .map(|row| {
                let id: String = row
                    .try_get("connection_id")
                    .map_err(|e| RegistryError::Serialization(e.to_string()))?;
                let connected_at: DateTime<Utc> = row
                    .try_get("connected_at")
                    .map_err(|e| RegistryError::Serialization(e.to_string()))?;
                let connection_id = ConnectionId::new(id)
                    .map_err(|e| RegistryError::Serialization(e.to_string()))?;
                Ok(ConnectionRecord::with_connected_at(
                    connection_id,
                    Timestamp::from_datetime(connected_at),
                ))
            })
            .collect()
    }
}
