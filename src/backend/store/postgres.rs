/**
 * Postgres Repository
 *
 * Connection pool and migrations for the Postgres backend. The trait
 * implementations for each collection live beside their records:
 * `auth::users`, `auth::sessions`, `chat::db` and `messaging::db`.
 */
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::backend::store::{Repository, StoreError, StoreResult};

/// Postgres-backed repository
#[derive(Clone)]
pub struct PgRepository {
    pub(crate) pool: PgPool,
}

impl PgRepository {
    /// Open a connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create database connection pool: {:?}", e);
                StoreError::Database(e)
            })?;

        tracing::info!("Database connection pool created successfully");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!().run(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            StoreError::Migration(e)
        })?;
        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Repository for PgRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Map a unique-constraint violation to `StoreError::Conflict`
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(what.to_string());
        }
    }
    StoreError::Database(err)
}

/// Convert a `COUNT(*)` result
pub(crate) fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_count_clamps_negative() {
        assert_eq!(count(-1), 0);
        assert_eq!(count(42), 42);
    }
}
