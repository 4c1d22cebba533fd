/// Weather gateway
///
/// Tiered lookup: ephemeral cache, then the durable store (freshness
/// checked here, warming the ephemeral tier on a hit), then the upstream
/// provider. Concurrent misses on one fingerprint may each fetch upstream;
/// the resulting upserts are idempotent per key and freshness window.
use crate::{
    cache::CacheBackend,
    error::{GatewayError, GatewayResult},
    fingerprint, metrics,
    places::PlacesGateway,
    weather::{aggregate_daily, CityForecast, DailyForecast, ForecastApi, WeatherStore},
};
use crate::places::Coordinates;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Freshness window for the durable tier, in seconds (3 hours)
pub const FORECAST_TTL_SECS: u64 = 10800;

pub struct WeatherGateway {
    provider: Arc<dyn ForecastApi>,
    cache: Arc<dyn CacheBackend>,
    store: WeatherStore,
    places: Arc<PlacesGateway>,
    ttl_secs: u64,
}

impl WeatherGateway {
    pub fn new(
        provider: Arc<dyn ForecastApi>,
        cache: Arc<dyn CacheBackend>,
        store: WeatherStore,
        places: Arc<PlacesGateway>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            provider,
            cache,
            store,
            places,
            ttl_secs,
        }
    }

    /// Five-day daily forecast for a coordinate pair.
    ///
    /// The fingerprint uses rounded coordinates; the upstream call receives
    /// the caller's exact ones.
    pub async fn get_forecast(&self, lat: f64, lng: f64) -> GatewayResult<Vec<DailyForecast>> {
        metrics::record_operation("get_forecast");
        let key = fingerprint::forecast_key(lat, lng);

        // Fast tier
        if let Some(cached) = self.cache.get(&key).await? {
            match serde_json::from_str::<Vec<DailyForecast>>(&cached) {
                Ok(forecast) => {
                    metrics::record_cache_access("ephemeral", true);
                    return Ok(forecast);
                }
                Err(e) => warn!("Discarding corrupted cache entry {}: {}", key, e),
            }
        }
        metrics::record_cache_access("ephemeral", false);

        // Durability fallback; survives a Redis restart
        if let Some(row) = self.store.find_by_key(&key).await? {
            if row.is_fresh(Utc::now(), self.ttl_secs) {
                metrics::record_cache_access("durable", true);
                debug!("Warming ephemeral cache from durable row: {}", key);
                let serialized = serde_json::to_string(&row.payload)
                    .map_err(|e| GatewayError::Internal(format!("Serialize failed: {}", e)))?;
                self.cache.set(&key, &serialized, self.ttl_secs).await?;
                return Ok(row.payload);
            }
            // Stale rows stay in place until the next upsert overwrites them
        }
        metrics::record_cache_access("durable", false);

        let samples = self.provider.forecast(lat, lng).await?;
        let forecast = aggregate_daily(&samples);

        self.store.upsert(&key, &forecast, Utc::now()).await?;

        let serialized = serde_json::to_string(&forecast)
            .map_err(|e| GatewayError::Internal(format!("Serialize failed: {}", e)))?;
        self.cache.set(&key, &serialized, self.ttl_secs).await?;

        Ok(forecast)
    }

    /// Forecast for a city resolved by name; None when the city cannot be
    /// geocoded. Optional date bounds filter the daily sequence inclusively
    /// (YYYY-MM-DD strings compare correctly lexicographically).
    pub async fn get_forecast_by_city(
        &self,
        city: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> GatewayResult<Option<CityForecast>> {
        metrics::record_operation("get_forecast_by_city");

        let Some(location) = self.places.geocode(city).await? else {
            return Ok(None);
        };

        let mut forecast = self.get_forecast(location.lat, location.lng).await?;

        if start_date.is_some() || end_date.is_some() {
            forecast.retain(|day| {
                if let Some(start) = start_date {
                    if day.date.as_str() < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if day.date.as_str() > end {
                        return false;
                    }
                }
                true
            });
        }

        let city_en = location
            .formatted_address
            .split(',')
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Some(CityForecast {
            city: city.to_string(),
            city_en,
            coordinates: Coordinates {
                lat: location.lat,
                lng: location.lng,
            },
            forecast,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::places::provider::{PlacesApi, RawGeocodeResult, RawGeometry, RawLatLng, RawPlace};
    use crate::weather::provider::{ForecastSample, SampleCondition, SampleMain};
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeForecastApi {
        samples: Vec<ForecastSample>,
        calls: AtomicUsize,
    }

    impl FakeForecastApi {
        fn new(samples: Vec<ForecastSample>) -> Self {
            Self {
                samples,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ForecastApi for FakeForecastApi {
        async fn forecast(&self, _lat: f64, _lng: f64) -> GatewayResult<Vec<ForecastSample>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.samples.clone())
        }
    }

    struct FakeGeocoder {
        results: Vec<RawGeocodeResult>,
    }

    #[async_trait]
    impl PlacesApi for FakeGeocoder {
        async fn text_search(&self, _query: &str) -> GatewayResult<Vec<RawPlace>> {
            Ok(vec![])
        }

        async fn geocode(&self, _address: &str) -> GatewayResult<Vec<RawGeocodeResult>> {
            Ok(self.results.clone())
        }
    }

    fn sample(dt_txt: &str, temp: f64) -> ForecastSample {
        ForecastSample {
            dt_txt: dt_txt.to_string(),
            main: SampleMain {
                temp,
                humidity: 60.0,
            },
            weather: vec![SampleCondition {
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
            }],
            pop: Some(0.1),
        }
    }

    fn five_day_samples() -> Vec<ForecastSample> {
        (0..5)
            .map(|day| sample(&format!("2024-01-{:02} 12:00:00", 15 + day), 5.0 + day as f64))
            .collect()
    }

    async fn build_gateway(
        provider: Arc<FakeForecastApi>,
        geocode_results: Vec<RawGeocodeResult>,
    ) -> (WeatherGateway, Arc<MemoryCache>, WeatherStore) {
        let db = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::init_schema(&db).await.unwrap();
        let store = WeatherStore::new(db);

        let cache = Arc::new(MemoryCache::new());
        let places = Arc::new(PlacesGateway::new(
            Arc::new(FakeGeocoder {
                results: geocode_results,
            }),
            Arc::new(MemoryCache::new()),
            86400,
        ));

        let gateway = WeatherGateway::new(
            provider,
            Arc::clone(&cache) as Arc<dyn CacheBackend>,
            store.clone(),
            places,
            FORECAST_TTL_SECS,
        );

        (gateway, cache, store)
    }

    fn paris_geocode() -> Vec<RawGeocodeResult> {
        vec![RawGeocodeResult {
            formatted_address: "Paris, France".to_string(),
            geometry: RawGeometry {
                location: RawLatLng {
                    lat: 48.8566,
                    lng: 2.3522,
                },
            },
        }]
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_both_tiers() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, cache, store) = build_gateway(Arc::clone(&provider), vec![]).await;

        let forecast = gateway.get_forecast(48.8566, 2.3522).await.unwrap();
        assert_eq!(forecast.len(), 5);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let key = fingerprint::forecast_key(48.8566, 2.3522);
        assert!(cache.contains(&key));
        assert!(store.find_by_key(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ephemeral_hit_skips_store_and_provider() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(Arc::clone(&provider), vec![]).await;

        gateway.get_forecast(48.8566, 2.3522).await.unwrap();
        gateway.get_forecast(48.8566, 2.3522).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nearby_coordinates_share_one_entry() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(Arc::clone(&provider), vec![]).await;

        gateway.get_forecast(48.8566, 2.3522).await.unwrap();
        gateway.get_forecast(48.8571, 2.3518).await.unwrap();

        // Both round to the same fingerprint
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fresh_durable_row_serves_and_warms_ephemeral() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, cache, store) = build_gateway(Arc::clone(&provider), vec![]).await;

        let key = fingerprint::forecast_key(48.8566, 2.3522);
        let payload = aggregate_daily(&five_day_samples());
        store
            .upsert(
                &key,
                &payload,
                Utc::now() - chrono::Duration::seconds(10799),
            )
            .await
            .unwrap();

        let forecast = gateway.get_forecast(48.8566, 2.3522).await.unwrap();
        assert_eq!(forecast, payload);
        // Served from the durable tier without an upstream call
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        // Ephemeral tier warmed for subsequent lookups
        assert!(cache.contains(&key));
    }

    #[tokio::test]
    async fn test_stale_durable_row_triggers_refetch() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, store) = build_gateway(Arc::clone(&provider), vec![]).await;

        let key = fingerprint::forecast_key(48.8566, 2.3522);
        let stale_fetch = Utc::now() - chrono::Duration::seconds(10801);
        store
            .upsert(&key, &aggregate_daily(&five_day_samples()), stale_fetch)
            .await
            .unwrap();

        gateway.get_forecast(48.8566, 2.3522).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        // The stale row was overwritten, not deleted
        let row = store.find_by_key(&key).await.unwrap().unwrap();
        assert!(row.fetched_at > stale_fetch);
    }

    #[tokio::test]
    async fn test_by_city_unresolvable_is_none() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(provider, vec![]).await;

        let result = gateway
            .get_forecast_by_city("Atlantis", None, None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_by_city_bundles_composite_result() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(provider, paris_geocode()).await;

        let result = gateway
            .get_forecast_by_city("Париж", None, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.city, "Париж");
        assert_eq!(result.city_en, "Paris");
        assert_eq!(result.coordinates.lat, 48.8566);
        assert_eq!(result.forecast.len(), 5);
    }

    #[tokio::test]
    async fn test_by_city_date_filter_is_inclusive() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(provider, paris_geocode()).await;

        let result = gateway
            .get_forecast_by_city("Paris", Some("2024-01-16"), Some("2024-01-17"))
            .await
            .unwrap()
            .unwrap();

        let dates: Vec<&str> = result.forecast.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-16", "2024-01-17"]);
    }

    #[tokio::test]
    async fn test_by_city_open_ended_bounds() {
        let provider = Arc::new(FakeForecastApi::new(five_day_samples()));
        let (gateway, _cache, _store) = build_gateway(provider, paris_geocode()).await;

        let result = gateway
            .get_forecast_by_city("Paris", Some("2024-01-18"), None)
            .await
            .unwrap()
            .unwrap();

        let dates: Vec<&str> = result.forecast.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-18", "2024-01-19"]);
    }
}
