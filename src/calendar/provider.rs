/// Calendar provider client
///
/// OAuth consent URL construction, authorization-code exchange, token
/// refresh, and authenticated event insertion against the Google Calendar
/// API, with the wire shapes made explicit.
use crate::config::{CalendarProviderConfig, OAuthConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::{calendar::{CreatedEvent, EventInput}, metrics};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

/// Scopes requested for calendar access
const SCOPES: &str =
    "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/calendar.events";

/// Token endpoint response
///
/// `refresh_token` is only present on first consent; rotation responses
/// omit it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
    #[serde(rename = "htmlLink")]
    html_link: String,
}

/// Calendar provider contract
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Consent URL the user is redirected to; the user id rides in `state`
    fn auth_url(&self, user_id: &str) -> String;

    /// Exchange an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> GatewayResult<TokenResponse>;

    /// Trade a refresh token for a fresh access token
    async fn refresh(&self, refresh_token: &str) -> GatewayResult<TokenResponse>;

    /// Insert an all-day event into the user's primary calendar
    async fn insert_event(
        &self,
        access_token: &str,
        event: &EventInput,
    ) -> GatewayResult<CreatedEvent>;
}

/// Google Calendar HTTP client
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    config: CalendarProviderConfig,
    oauth: OAuthConfig,
}

impl GoogleCalendarClient {
    pub fn new(
        config: CalendarProviderConfig,
        oauth: OAuthConfig,
        timeout_secs: u64,
    ) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            oauth,
        })
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> GatewayResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream_request("calendar", "error");
                GatewayError::Upstream(format!("Token request failed: {}", e))
            })?;

        if !response.status().is_success() {
            metrics::record_upstream_request("calendar", "error");
            return Err(GatewayError::Upstream(format!(
                "Token endpoint returned HTTP {}",
                response.status()
            )));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            metrics::record_upstream_request("calendar", "error");
            GatewayError::Upstream(format!("Invalid token response: {}", e))
        })?;

        metrics::record_upstream_request("calendar", "ok");
        Ok(tokens)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    fn auth_url(&self, user_id: &str) -> String {
        // Offline access + forced consent so a refresh token is issued
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.oauth.client_id.as_str()),
                ("redirect_uri", self.oauth.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", SCOPES),
                ("state", user_id),
            ],
        );

        match url {
            Ok(url) => url.to_string(),
            // The auth URL comes from configuration; a parse failure would
            // have been caught at startup validation
            Err(_) => self.config.auth_url.clone(),
        }
    }

    async fn exchange_code(&self, code: &str) -> GatewayResult<TokenResponse> {
        self.token_request(&[
            ("code", code),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("redirect_uri", self.oauth.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> GatewayResult<TokenResponse> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn insert_event(
        &self,
        access_token: &str,
        event: &EventInput,
    ) -> GatewayResult<CreatedEvent> {
        // All-day event with the fixed reminder overrides: email a day
        // ahead, popup ten minutes ahead
        let body = json!({
            "summary": event.title,
            "description": event.description.clone().unwrap_or_default(),
            "start": { "date": event.start_date },
            "end": { "date": event.end_date },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 24 * 60 },
                    { "method": "popup", "minutes": 10 }
                ]
            }
        });

        let response = self
            .http_client
            .post(&self.config.events_url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream_request("calendar", "error");
                GatewayError::Upstream(format!("Event insert failed: {}", e))
            })?;

        if !response.status().is_success() {
            metrics::record_upstream_request("calendar", "error");
            return Err(GatewayError::Upstream(format!(
                "Event insert returned HTTP {}",
                response.status()
            )));
        }

        let inserted: InsertedEvent = response.json().await.map_err(|e| {
            metrics::record_upstream_request("calendar", "error");
            GatewayError::Upstream(format!("Invalid event response: {}", e))
        })?;

        metrics::record_upstream_request("calendar", "ok");
        Ok(CreatedEvent {
            event_id: inserted.id,
            link: inserted.html_link,
        })
    }
}
