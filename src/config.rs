/// Configuration management for Meridian Gateway
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub providers: ProvidersConfig,
    pub oauth: OAuthConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration for the durable cache and token tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub gateway_db: PathBuf,
}

/// Ephemeral cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub redis_url: String,

    /// TTL for cached place searches and geocode results in seconds
    /// (default: 86400 = 24 hours; place ids may be cached up to 30 days)
    pub places_ttl: u64,

    /// TTL for cached weather forecasts in seconds (default: 10800 = 3 hours)
    pub weather_ttl: u64,
}

/// Upstream provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub maps: MapsProviderConfig,
    pub weather: WeatherProviderConfig,
    pub calendar: CalendarProviderConfig,
    /// Per-request timeout applied to every provider client, in seconds
    pub request_timeout_secs: u64,
}

/// Places/geocoding provider (Google Maps shaped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsProviderConfig {
    pub api_key: String,
    pub places_url: String,
    pub geocode_url: String,
}

/// Weather forecast provider (OpenWeatherMap shaped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherProviderConfig {
    pub api_key: String,
    pub forecast_url: String,
}

/// Calendar provider (Google Calendar shaped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarProviderConfig {
    pub auth_url: String,
    pub token_url: String,
    pub events_url: String,
}

/// OAuth client credentials for the calendar provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GATEWAY_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "3003".to_string())
            .parse()
            .map_err(|_| GatewayError::Validation("Invalid port number".to_string()))?;
        let version = env::var("GATEWAY_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("GATEWAY_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let gateway_db = env::var("GATEWAY_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("gateway.sqlite"));

        let redis_url = env::var("REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let places_ttl = env::var("CACHE_PLACES_TTL")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);
        let weather_ttl = env::var("CACHE_WEATHER_TTL")
            .unwrap_or_else(|_| "10800".to_string())
            .parse()
            .unwrap_or(crate::weather::gateway::FORECAST_TTL_SECS);

        let maps_api_key = env::var("GOOGLE_MAPS_API_KEY")
            .map_err(|_| GatewayError::Validation("Google Maps API key required".to_string()))?;
        let places_url = env::var("GOOGLE_MAPS_PLACES_URL").unwrap_or_else(|_| {
            "https://maps.googleapis.com/maps/api/place/textsearch/json".to_string()
        });
        let geocode_url = env::var("GOOGLE_MAPS_GEOCODE_URL")
            .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/geocode/json".to_string());

        let weather_api_key = env::var("OPENWEATHER_API_KEY")
            .map_err(|_| GatewayError::Validation("OpenWeather API key required".to_string()))?;
        let forecast_url = env::var("OPENWEATHER_FORECAST_URL")
            .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5/forecast".to_string());

        let calendar_auth_url = env::var("GOOGLE_OAUTH_AUTH_URL")
            .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string());
        let calendar_token_url = env::var("GOOGLE_OAUTH_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string());
        let calendar_events_url = env::var("GOOGLE_CALENDAR_EVENTS_URL").unwrap_or_else(|_| {
            "https://www.googleapis.com/calendar/v3/calendars/primary/events".to_string()
        });

        let request_timeout_secs = env::var("PROVIDER_REQUEST_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let oauth_client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| GatewayError::Validation("Google OAuth client id required".to_string()))?;
        let oauth_client_secret = env::var("GOOGLE_CLIENT_SECRET").map_err(|_| {
            GatewayError::Validation("Google OAuth client secret required".to_string())
        })?;
        let oauth_redirect_uri = env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
            format!(
                "http://{}:{}/api/v1/integrations/calendar/google/callback",
                hostname, port
            )
        });

        let rate_limit_enabled = env::var("RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let requests_per_second = env::var("RATE_LIMIT_REQUESTS_PER_SECOND")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);
        let burst_size = env::var("RATE_LIMIT_BURST_SIZE")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .unwrap_or(25);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(GatewayConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                gateway_db,
            },
            cache: CacheConfig {
                redis_url,
                places_ttl,
                weather_ttl,
            },
            providers: ProvidersConfig {
                maps: MapsProviderConfig {
                    api_key: maps_api_key,
                    places_url,
                    geocode_url,
                },
                weather: WeatherProviderConfig {
                    api_key: weather_api_key,
                    forecast_url,
                },
                calendar: CalendarProviderConfig {
                    auth_url: calendar_auth_url,
                    token_url: calendar_token_url,
                    events_url: calendar_events_url,
                },
                request_timeout_secs,
            },
            oauth: OAuthConfig {
                client_id: oauth_client_id,
                client_secret: oauth_client_secret,
                redirect_uri: oauth_redirect_uri,
            },
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                requests_per_second,
                burst_size,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GatewayError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.providers.maps.api_key.is_empty() {
            return Err(GatewayError::Validation(
                "Google Maps API key cannot be empty".to_string(),
            ));
        }

        if self.providers.weather.api_key.is_empty() {
            return Err(GatewayError::Validation(
                "OpenWeather API key cannot be empty".to_string(),
            ));
        }

        if self.cache.weather_ttl == 0 {
            return Err(GatewayError::Validation(
                "Weather cache TTL must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
