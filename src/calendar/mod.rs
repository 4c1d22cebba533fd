/// Calendar connection domain
///
/// OAuth token persistence and authenticated event insertion against the
/// calendar provider. Tokens are keyed by user id; a refresh token, once
/// stored, is never overwritten by an absent one (the provider only sends
/// it on first consent).
pub mod provider;
pub mod service;
pub mod store;

pub use provider::{CalendarApi, GoogleCalendarClient, TokenResponse};
pub use service::CalendarConnector;
pub use store::TokenStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider identifier stored with every token row
pub const CALENDAR_PROVIDER: &str = "google";

/// A stored OAuth token row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub user_id: Uuid,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the access token has passed its expiry; tokens without a
    /// recorded expiry are assumed usable
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// All-day event to insert into the user's primary calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD
    pub end_date: String,
}

/// Result of a successful event insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: String,
    pub link: String,
}
