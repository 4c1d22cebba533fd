/// Weather forecast provider client
///
/// Wire schema for the OpenWeatherMap 5-day/3-hour forecast endpoint and the
/// reqwest client that fetches it. The response carries ~40 samples spanning
/// 5 days; aggregation into daily summaries happens in `aggregate`.
use crate::error::{GatewayError, GatewayResult};
use crate::{config::WeatherProviderConfig, metrics};
use async_trait::async_trait;
use serde::Deserialize;

/// Weather provider contract
#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// Fetch raw three-hour forecast samples for a coordinate pair
    async fn forecast(&self, lat: f64, lng: f64) -> GatewayResult<Vec<ForecastSample>>;
}

/// One three-hour forecast sample
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSample {
    /// Sample timestamp, "YYYY-MM-DD HH:MM:SS"
    pub dt_txt: String,
    pub main: SampleMain,
    /// Conditions; the first entry is the primary one
    #[serde(default)]
    pub weather: Vec<SampleCondition>,
    /// Probability of precipitation, 0.0-1.0; absent means none forecast
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleCondition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSample>,
}

/// OpenWeatherMap HTTP client
pub struct OpenWeatherClient {
    http_client: reqwest::Client,
    config: WeatherProviderConfig,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherProviderConfig, timeout_secs: u64) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl ForecastApi for OpenWeatherClient {
    async fn forecast(&self, lat: f64, lng: f64) -> GatewayResult<Vec<ForecastSample>> {
        let response = self
            .http_client
            .get(&self.config.forecast_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("units", "metric".to_string()),
                ("lang", "en".to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                metrics::record_upstream_request("weather", "error");
                GatewayError::Upstream(format!("Forecast request failed: {}", e))
            })?;

        if !response.status().is_success() {
            metrics::record_upstream_request("weather", "error");
            return Err(GatewayError::Upstream(format!(
                "Forecast returned HTTP {}",
                response.status()
            )));
        }

        let body: ForecastResponse = response.json().await.map_err(|e| {
            metrics::record_upstream_request("weather", "error");
            GatewayError::Upstream(format!("Invalid forecast response: {}", e))
        })?;

        metrics::record_upstream_request("weather", "ok");
        Ok(body.list)
    }
}
