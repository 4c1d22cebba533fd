/// Places gateway
///
/// Orchestrates the fingerprint builder, the ephemeral cache and the places
/// provider. All four operations serve from cache when possible; a corrupted
/// cached entry is logged and treated as a miss (the subsequent write
/// replaces it).
use crate::{
    cache::CacheBackend,
    error::{GatewayError, GatewayResult},
    fingerprint, metrics,
    places::{normalize_place, CityInfo, Coordinates, GeocodeResult, PlaceRecord, PlacesApi, Poi},
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct PlacesGateway {
    provider: Arc<dyn PlacesApi>,
    cache: Arc<dyn CacheBackend>,
    /// TTL for cached search and geocode results, in seconds
    cache_ttl: u64,
}

impl PlacesGateway {
    pub fn new(provider: Arc<dyn PlacesApi>, cache: Arc<dyn CacheBackend>, cache_ttl: u64) -> Self {
        Self {
            provider,
            cache,
            cache_ttl,
        }
    }

    /// Free-text place search, cached as the normalized array
    pub async fn search_places(&self, query: &str) -> GatewayResult<Vec<PlaceRecord>> {
        metrics::record_operation("search_places");
        let key = fingerprint::search_key(query);

        if let Some(cached) = self.cache.get(&key).await? {
            match serde_json::from_str::<Vec<PlaceRecord>>(&cached) {
                Ok(places) => {
                    metrics::record_cache_access("ephemeral", true);
                    return Ok(places);
                }
                Err(e) => warn!("Discarding corrupted cache entry {}: {}", key, e),
            }
        }
        metrics::record_cache_access("ephemeral", false);

        let raw = self.provider.text_search(query).await?;
        let places: Vec<PlaceRecord> = raw.iter().map(normalize_place).collect();

        let serialized = serde_json::to_string(&places)
            .map_err(|e| GatewayError::Internal(format!("Serialize failed: {}", e)))?;
        self.cache.set(&key, &serialized, self.cache_ttl).await?;

        debug!("Cached {} places for query {:?}", places.len(), query);
        Ok(places)
    }

    /// Forward geocode; None when the provider finds nothing
    pub async fn geocode(&self, address: &str) -> GatewayResult<Option<GeocodeResult>> {
        metrics::record_operation("geocode");
        let key = fingerprint::geocode_key(address);

        if let Some(cached) = self.cache.get(&key).await? {
            match serde_json::from_str::<GeocodeResult>(&cached) {
                Ok(location) => {
                    metrics::record_cache_access("ephemeral", true);
                    return Ok(Some(location));
                }
                Err(e) => warn!("Discarding corrupted cache entry {}: {}", key, e),
            }
        }
        metrics::record_cache_access("ephemeral", false);

        let results = self.provider.geocode(address).await?;
        let Some(first) = results.first() else {
            return Ok(None);
        };

        let location = GeocodeResult {
            lat: first.geometry.location.lat,
            lng: first.geometry.location.lng,
            formatted_address: first.formatted_address.clone(),
        };

        let serialized = serde_json::to_string(&location)
            .map_err(|e| GatewayError::Internal(format!("Serialize failed: {}", e)))?;
        self.cache.set(&key, &serialized, self.cache_ttl).await?;

        Ok(Some(location))
    }

    /// Search POIs per interest, one upstream call per interest.
    ///
    /// Results keep interest-list order first, then place order within each
    /// interest.
    pub async fn search_pois(&self, city: &str, interests: &[String]) -> GatewayResult<Vec<Poi>> {
        metrics::record_operation("search_pois");
        let mut results = Vec::new();

        for interest in interests {
            let query = format!("{} in {}", interest, city);
            let places = self.search_places(&query).await?;

            for place in places {
                results.push(Poi {
                    name: place.name,
                    lat: place.lat,
                    lng: place.lng,
                    rating: place.rating,
                    category: interest.clone(),
                    city: city.to_string(),
                    address: place.address,
                    external_ref: place.external_ref,
                });
            }
        }

        Ok(results)
    }

    /// City information derived from a geocode of the city name.
    ///
    /// The English name is the text before the first comma of the formatted
    /// address, the country the text after the last comma, both trimmed.
    pub async fn city_info(&self, city: &str) -> GatewayResult<Option<CityInfo>> {
        metrics::record_operation("city_info");

        let Some(location) = self.geocode(city).await? else {
            return Ok(None);
        };

        let parts: Vec<&str> = location.formatted_address.split(',').collect();
        let name_en = parts.first().map(|s| s.trim()).unwrap_or_default();
        let country = parts.last().map(|s| s.trim()).unwrap_or_default();

        Ok(Some(CityInfo {
            name: city.to_string(),
            name_en: name_en.to_string(),
            coordinates: Coordinates {
                lat: location.lat,
                lng: location.lng,
            },
            country: country.to_string(),
            formatted_address: location.formatted_address,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::error::GatewayResult;
    use crate::places::provider::{RawGeocodeResult, RawGeometry, RawLatLng, RawPlace};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePlacesApi {
        places: Vec<RawPlace>,
        geocode_results: Vec<RawGeocodeResult>,
        search_calls: AtomicUsize,
        geocode_calls: AtomicUsize,
    }

    impl FakePlacesApi {
        fn new(places: Vec<RawPlace>, geocode_results: Vec<RawGeocodeResult>) -> Self {
            Self {
                places,
                geocode_results,
                search_calls: AtomicUsize::new(0),
                geocode_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlacesApi for FakePlacesApi {
        async fn text_search(&self, _query: &str) -> GatewayResult<Vec<RawPlace>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.places.clone())
        }

        async fn geocode(&self, _address: &str) -> GatewayResult<Vec<RawGeocodeResult>> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.geocode_results.clone())
        }
    }

    fn raw_place(id: &str, name: &str) -> RawPlace {
        RawPlace {
            place_id: id.to_string(),
            name: Some(name.to_string()),
            formatted_address: Some(format!("{} street, Kyiv, Ukraine", name)),
            geometry: RawGeometry {
                location: RawLatLng {
                    lat: 50.45,
                    lng: 30.52,
                },
            },
            rating: Some(4.5),
            types: Some(vec!["museum".to_string()]),
            photos: None,
        }
    }

    fn raw_geocode(address: &str) -> RawGeocodeResult {
        RawGeocodeResult {
            formatted_address: address.to_string(),
            geometry: RawGeometry {
                location: RawLatLng {
                    lat: 48.8566,
                    lng: 2.3522,
                },
            },
        }
    }

    fn gateway(provider: Arc<FakePlacesApi>) -> PlacesGateway {
        PlacesGateway::new(provider, Arc::new(MemoryCache::new()), 86400)
    }

    #[tokio::test]
    async fn test_search_places_caches_normalized_results() {
        let provider = Arc::new(FakePlacesApi::new(
            vec![raw_place("p1", "History Museum")],
            vec![],
        ));
        let gateway = gateway(Arc::clone(&provider));

        let first = gateway.search_places("museums in Kyiv").await.unwrap();
        let second = gateway.search_places("museums in Kyiv").await.unwrap();

        assert_eq!(first, second);
        // Second lookup served from cache
        assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_geocode_returns_first_result() {
        let provider = Arc::new(FakePlacesApi::new(
            vec![],
            vec![raw_geocode("Paris, France"), raw_geocode("Paris, TX, USA")],
        ));
        let gateway = gateway(provider);

        let location = gateway.geocode("Paris").await.unwrap().unwrap();
        assert_eq!(location.formatted_address, "Paris, France");
        assert_eq!(location.lat, 48.8566);
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_none_and_not_cached() {
        let provider = Arc::new(FakePlacesApi::new(vec![], vec![]));
        let gateway = gateway(Arc::clone(&provider));

        assert!(gateway.geocode("Nowhereville").await.unwrap().is_none());
        assert!(gateway.geocode("Nowhereville").await.unwrap().is_none());
        // A missing address is re-queried, not cached
        assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_pois_projects_and_orders_by_interest() {
        let provider = Arc::new(FakePlacesApi::new(
            vec![raw_place("p1", "Spot A"), raw_place("p2", "Spot B")],
            vec![],
        ));
        let gateway = gateway(provider);

        let interests = vec!["history".to_string(), "food".to_string()];
        let pois = gateway.search_pois("Kyiv", &interests).await.unwrap();

        assert_eq!(pois.len(), 4);
        assert_eq!(pois[0].category, "history");
        assert_eq!(pois[0].name, "Spot A");
        assert_eq!(pois[1].category, "history");
        assert_eq!(pois[2].category, "food");
        assert_eq!(pois[3].name, "Spot B");
        assert!(pois.iter().all(|p| p.city == "Kyiv"));
    }

    #[tokio::test]
    async fn test_city_info_heuristic_parse() {
        let provider = Arc::new(FakePlacesApi::new(vec![], vec![raw_geocode("Paris, France")]));
        let gateway = gateway(provider);

        let info = gateway.city_info("Париж").await.unwrap().unwrap();
        assert_eq!(info.name, "Париж");
        assert_eq!(info.name_en, "Paris");
        assert_eq!(info.country, "France");
        assert_eq!(info.coordinates.lat, 48.8566);
    }

    #[tokio::test]
    async fn test_city_info_unresolvable_is_none() {
        let provider = Arc::new(FakePlacesApi::new(vec![], vec![]));
        let gateway = gateway(provider);
        assert!(gateway.city_info("Atlantis").await.unwrap().is_none());
    }
}
