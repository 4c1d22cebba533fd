/// Database layer for Meridian Gateway
///
/// Manages the SQLite connection pool and schema for the durable weather
/// cache and calendar token tables.
use crate::error::{GatewayError, GatewayResult};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> GatewayResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePool::connect_with(
        sqlx::sqlite::SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(if options.enable_wal {
                sqlx::sqlite::SqliteJournalMode::Wal
            } else {
                sqlx::sqlite::SqliteJournalMode::Delete
            })
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5)),
    )
    .await
    .map_err(GatewayError::Database)?;

    Ok(pool)
}

/// Create the gateway tables if they do not exist
///
/// The weather cache key column is bounded to 64 characters; the fingerprint
/// builder guarantees keys fit (hashing longer ones).
pub async fn init_schema(pool: &SqlitePool) -> GatewayResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_cache (
            query_hash TEXT PRIMARY KEY CHECK (length(query_hash) <= 64),
            payload TEXT NOT NULL,
            fetched_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(GatewayError::Database)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS calendar_token (
            user_id TEXT PRIMARY KEY,
            provider TEXT NOT NULL DEFAULT 'google',
            access_token TEXT NOT NULL,
            refresh_token TEXT,
            expires_at TEXT,
            scope TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(GatewayError::Database)?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> GatewayResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(GatewayError::Database)?;

    Ok(())
}
