/// Durable weather cache - SQLite fallback tier
///
/// Rows carry the aggregated payload plus a fetch timestamp; the store
/// itself enforces no TTL. Freshness is computed by the caller against
/// `fetched_at`, and a stale row is never deleted; the next successful
/// fetch overwrites it.
use crate::error::{GatewayError, GatewayResult};
use crate::weather::DailyForecast;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// A durable cache row, deserialized
#[derive(Debug, Clone)]
pub struct CachedForecast {
    pub payload: Vec<DailyForecast>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedForecast {
    /// Whether the row is still within the freshness window
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        now - self.fetched_at < chrono::Duration::seconds(ttl_secs as i64)
    }
}

/// Durable weather cache store
#[derive(Clone)]
pub struct WeatherStore {
    db: SqlitePool,
}

impl WeatherStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert or replace the row for a fingerprint
    pub async fn upsert(
        &self,
        query_hash: &str,
        payload: &[DailyForecast],
        fetched_at: DateTime<Utc>,
    ) -> GatewayResult<()> {
        let serialized = serde_json::to_string(payload)
            .map_err(|e| GatewayError::Internal(format!("Serialize failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO weather_cache (query_hash, payload, fetched_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(query_hash) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(query_hash)
        .bind(&serialized)
        .bind(fetched_at.to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Look up the row for a fingerprint; freshness is the caller's concern
    pub async fn find_by_key(&self, query_hash: &str) -> GatewayResult<Option<CachedForecast>> {
        let result = sqlx::query(
            r#"
            SELECT payload, fetched_at
            FROM weather_cache
            WHERE query_hash = ?1
            "#,
        )
        .bind(query_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(GatewayError::Database)?;

        let Some(row) = result else {
            return Ok(None);
        };

        let payload: Vec<DailyForecast> =
            serde_json::from_str(&row.try_get::<String, _>("payload")?)
                .map_err(|e| GatewayError::Internal(format!("Invalid cached payload: {}", e)))?;
        let fetched_at = parse_timestamp(&row.try_get::<String, _>("fetched_at")?)?;

        Ok(Some(CachedForecast {
            payload,
            fetched_at,
        }))
    }
}

/// Parse RFC3339 timestamp
fn parse_timestamp(s: &str) -> GatewayResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::Internal(format!("Invalid timestamp: {}", e)))
}
