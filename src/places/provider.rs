/// Places/geocoding provider client
///
/// Wire schemas for the Google Maps text-search and geocoding APIs, with all
/// optional fields explicit, and the reqwest client that talks to them.
use crate::error::{GatewayError, GatewayResult};
use crate::{config::MapsProviderConfig, metrics};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

/// Places/geocoding provider contract
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Free-text place search
    async fn text_search(&self, query: &str) -> GatewayResult<Vec<RawPlace>>;

    /// Forward geocode an address; zero results is a valid outcome
    async fn geocode(&self, address: &str) -> GatewayResult<Vec<RawGeocodeResult>>;
}

/// Raw place record as returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: RawGeometry,
    pub rating: Option<f64>,
    pub types: Option<Vec<String>>,
    pub photos: Option<Vec<RawPhoto>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGeometry {
    pub location: RawLatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPhoto {
    pub photo_reference: String,
}

/// Raw geocode result as returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeocodeResult {
    pub formatted_address: String,
    pub geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawGeocodeResult>,
}

/// Google Maps HTTP client
pub struct GoogleMapsClient {
    http_client: reqwest::Client,
    config: MapsProviderConfig,
}

impl GoogleMapsClient {
    pub fn new(config: MapsProviderConfig, timeout_secs: u64) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// "OK" carries results; "ZERO_RESULTS" is a valid empty outcome.
    /// Everything else (OVER_QUERY_LIMIT, REQUEST_DENIED, ...) is a failure.
    fn check_status(status: &str, endpoint: &str) -> GatewayResult<()> {
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            other => {
                warn!("Maps {} returned status {}", endpoint, other);
                Err(GatewayError::Upstream(format!(
                    "Maps {} returned status {}",
                    endpoint, other
                )))
            }
        }
    }
}

#[async_trait]
impl PlacesApi for GoogleMapsClient {
    async fn text_search(&self, query: &str) -> GatewayResult<Vec<RawPlace>> {
        let response = self
            .http_client
            .get(&self.config.places_url)
            .query(&[
                ("query", query),
                ("key", self.config.api_key.as_str()),
                ("language", "en"),
            ])
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream_request("maps", "error");
                GatewayError::Upstream(format!("Place search request failed: {}", e))
            })?;

        if !response.status().is_success() {
            metrics::record_upstream_request("maps", "error");
            return Err(GatewayError::Upstream(format!(
                "Place search returned HTTP {}",
                response.status()
            )));
        }

        let body: TextSearchResponse = response.json().await.map_err(|e| {
            metrics::record_upstream_request("maps", "error");
            GatewayError::Upstream(format!("Invalid place search response: {}", e))
        })?;

        Self::check_status(&body.status, "text search")?;
        metrics::record_upstream_request("maps", "ok");

        Ok(body.results)
    }

    async fn geocode(&self, address: &str) -> GatewayResult<Vec<RawGeocodeResult>> {
        let response = self
            .http_client
            .get(&self.config.geocode_url)
            .query(&[("address", address), ("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream_request("maps", "error");
                GatewayError::Upstream(format!("Geocode request failed: {}", e))
            })?;

        if !response.status().is_success() {
            metrics::record_upstream_request("maps", "error");
            return Err(GatewayError::Upstream(format!(
                "Geocode returned HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            metrics::record_upstream_request("maps", "error");
            GatewayError::Upstream(format!("Invalid geocode response: {}", e))
        })?;

        Self::check_status(&body.status, "geocode")?;
        metrics::record_upstream_request("maps", "ok");

        Ok(body.results)
    }
}
