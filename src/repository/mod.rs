//! Repository layer for database operations

pub mod books;
pub mod fine_records;
pub mod fines;
pub mod orders;
pub mod partial_update;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use partial_update::{UpdateExecutor, UpdateStatement};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateExecutor for Repository {
    async fn execute_update(&self, statement: &UpdateStatement) -> AppResult<u64> {
        let result = statement
            .query()
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "value already used by another record"))?;
        Ok(result.rows_affected())
    }
}

/// Map constraint violations to client errors; everything else stays a
/// database error.
pub(crate) fn constraint_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict_message.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::Validation("referenced record does not exist".to_string());
        }
        if db.is_check_violation() {
            return AppError::Validation("value out of range".to_string());
        }
    }
    AppError::Database(e)
}
