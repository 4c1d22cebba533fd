/// Calendar token persistence
///
/// One row per user. Saves are upserts; the refresh token column is only
/// replaced when the incoming value is present, because the OAuth provider
/// sends a refresh token on first consent only.
use crate::calendar::{StoredToken, CALENDAR_PROVIDER};
use crate::error::{GatewayError, GatewayResult};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// New token values to persist for a user
#[derive(Debug, Clone)]
pub struct TokenUpdate {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

/// Token store backed by the gateway database
#[derive(Clone)]
pub struct TokenStore {
    db: SqlitePool,
}

impl TokenStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert or update the token row for a user.
    ///
    /// An absent refresh token in `update` leaves any previously stored
    /// refresh token in place.
    pub async fn save(&self, user_id: Uuid, update: &TokenUpdate) -> GatewayResult<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_token
                (user_id, provider, access_token, refresh_token, expires_at, scope, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = COALESCE(excluded.refresh_token, calendar_token.refresh_token),
                expires_at = excluded.expires_at,
                scope = excluded.scope,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id.to_string())
        .bind(CALENDAR_PROVIDER)
        .bind(&update.access_token)
        .bind(&update.refresh_token)
        .bind(update.expires_at.map(|at| at.to_rfc3339()))
        .bind(&update.scope)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Look up the token row for a user
    pub async fn find_by_user(&self, user_id: Uuid) -> GatewayResult<Option<StoredToken>> {
        let result = sqlx::query(
            r#"
            SELECT user_id, provider, access_token, refresh_token, expires_at, scope, updated_at
            FROM calendar_token
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.db)
        .await
        .map_err(GatewayError::Database)?;

        let Some(row) = result else {
            return Ok(None);
        };

        let user_id: String = row.try_get("user_id")?;
        let user_id = Uuid::parse_str(&user_id)
            .map_err(|e| GatewayError::Internal(format!("Invalid stored user id: {}", e)))?;

        Ok(Some(StoredToken {
            user_id,
            provider: row.try_get("provider")?,
            access_token: row.try_get("access_token")?,
            refresh_token: row.try_get("refresh_token")?,
            expires_at: row
                .try_get::<Option<String>, _>("expires_at")?
                .map(|s| parse_timestamp(&s))
                .transpose()?,
            scope: row.try_get("scope")?,
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        }))
    }
}

/// Parse RFC3339 timestamp
fn parse_timestamp(s: &str) -> GatewayResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::Internal(format!("Invalid timestamp: {}", e)))
}
