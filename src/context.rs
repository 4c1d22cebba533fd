/// Application context and dependency injection
use crate::{
    cache::{CacheBackend, CacheClient},
    calendar::{CalendarConnector, GoogleCalendarClient, TokenStore},
    config::GatewayConfig,
    db,
    error::GatewayResult,
    places::{GoogleMapsClient, PlacesGateway},
    rate_limit::RateLimiter,
    weather::{OpenWeatherClient, WeatherGateway, WeatherStore},
};
use std::sync::Arc;

/// Application context holding all shared services
///
/// Clients and stores are created once at startup and handed into the
/// gateway constructors by reference; nothing here is ambient module state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub places: Arc<PlacesGateway>,
    pub weather: Arc<WeatherGateway>,
    pub calendar: Arc<CalendarConnector>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: GatewayConfig) -> GatewayResult<Self> {
        // Validate configuration
        config.validate()?;

        // Initialize gateway database
        let db = db::create_pool(&config.storage.gateway_db, db::DatabaseOptions::default())
            .await?;
        db::init_schema(&db).await?;
        db::test_connection(&db).await?;

        // Connect the ephemeral cache tier
        let cache: Arc<dyn CacheBackend> =
            Arc::new(CacheClient::connect(&config.cache.redis_url).await?);

        let timeout = config.providers.request_timeout_secs;

        // Places gateway: provider + ephemeral cache
        let maps_client = Arc::new(GoogleMapsClient::new(
            config.providers.maps.clone(),
            timeout,
        )?);
        let places = Arc::new(PlacesGateway::new(
            maps_client,
            Arc::clone(&cache),
            config.cache.places_ttl,
        ));

        // Weather gateway: provider + both cache tiers + places for geocoding
        let weather_client = Arc::new(OpenWeatherClient::new(
            config.providers.weather.clone(),
            timeout,
        )?);
        let weather = Arc::new(WeatherGateway::new(
            weather_client,
            Arc::clone(&cache),
            WeatherStore::new(db.clone()),
            Arc::clone(&places),
            config.cache.weather_ttl,
        ));

        // Calendar connector: provider + token store
        let calendar_client = Arc::new(GoogleCalendarClient::new(
            config.providers.calendar.clone(),
            config.oauth.clone(),
            timeout,
        )?);
        let calendar = Arc::new(CalendarConnector::new(
            calendar_client,
            TokenStore::new(db.clone()),
        ));

        // Initialize rate limiter
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Ok(Self {
            config: Arc::new(config),
            places,
            weather,
            calendar,
            rate_limiter,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
