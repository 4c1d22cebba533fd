/// Calendar connector service
///
/// Orchestrates the token store and the calendar provider: completing the
/// OAuth connection, reporting connection status, and inserting events with
/// an on-demand access-token refresh when the stored one has expired.
use crate::calendar::{
    store::TokenUpdate, CalendarApi, CreatedEvent, EventInput, TokenResponse, TokenStore,
};
use crate::error::{GatewayError, GatewayResult};
use crate::metrics;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct CalendarConnector {
    api: Arc<dyn CalendarApi>,
    store: TokenStore,
}

impl CalendarConnector {
    pub fn new(api: Arc<dyn CalendarApi>, store: TokenStore) -> Self {
        Self { api, store }
    }

    /// Consent URL for starting the OAuth flow
    pub fn connect_url(&self, user_id: Uuid) -> String {
        self.api.auth_url(&user_id.to_string())
    }

    /// Finish the OAuth flow: exchange the authorization code and persist
    /// the resulting tokens
    pub async fn complete_connect(&self, user_id: Uuid, code: &str) -> GatewayResult<()> {
        let tokens = self.api.exchange_code(code).await?;
        self.save_tokens(user_id, &tokens).await?;
        info!("Calendar connected for user {}", user_id);
        Ok(())
    }

    /// Persist a token response; an absent refresh token leaves the stored
    /// one untouched
    pub async fn save_tokens(&self, user_id: Uuid, tokens: &TokenResponse) -> GatewayResult<()> {
        let expires_at = tokens
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        self.store
            .save(
                user_id,
                &TokenUpdate {
                    access_token: tokens.access_token.clone(),
                    refresh_token: tokens.refresh_token.clone(),
                    expires_at,
                    scope: tokens.scope.clone(),
                },
            )
            .await
    }

    /// Whether the user has a stored calendar connection
    pub async fn is_connected(&self, user_id: Uuid) -> GatewayResult<bool> {
        Ok(self.store.find_by_user(user_id).await?.is_some())
    }

    /// Insert an event into the user's primary calendar.
    ///
    /// Refreshes the access token first when the stored one has expired and
    /// a refresh token is available; the rotated access token is persisted.
    pub async fn create_event(
        &self,
        user_id: Uuid,
        event: &EventInput,
    ) -> GatewayResult<CreatedEvent> {
        metrics::record_operation("create_event");

        let Some(stored) = self.store.find_by_user(user_id).await? else {
            return Err(GatewayError::Unauthenticated(
                "Calendar not connected".to_string(),
            ));
        };

        let access_token = if stored.is_expired(Utc::now()) {
            match &stored.refresh_token {
                Some(refresh_token) => {
                    debug!("Refreshing expired access token for user {}", user_id);
                    let rotated = self.api.refresh(refresh_token).await?;
                    self.save_tokens(user_id, &rotated).await?;
                    rotated.access_token
                }
                // No refresh token stored; let the provider reject the
                // stale access token
                None => stored.access_token,
            }
        } else {
            stored.access_token
        };

        self.api.insert_event(&access_token, event).await
    }
}
