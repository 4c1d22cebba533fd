/// Weather forecast domain
///
/// Collapses the provider's three-hour forecast samples into daily summaries
/// and serves them through a two-tier cache: Redis for hot lookups, SQLite
/// as the durability fallback that survives a Redis restart.
pub mod aggregate;
pub mod gateway;
pub mod provider;
pub mod store;

pub use aggregate::aggregate_daily;
pub use gateway::WeatherGateway;
pub use provider::{ForecastApi, ForecastSample, OpenWeatherClient};
pub use store::WeatherStore;

use crate::places::Coordinates;
use serde::{Deserialize, Serialize};

/// Daily forecast summary reduced from sub-daily samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Minimum temperature over the day, 1 decimal place
    pub temp_min_c: f64,
    /// Maximum temperature over the day, 1 decimal place
    pub temp_max_c: f64,
    /// Most frequent condition description of the day
    pub condition: String,
    /// Most frequent provider icon code of the day
    pub icon: String,
    /// Rounded mean of sample humidity values
    pub humidity_percent: i64,
    /// Maximum probability of precipitation, as a percent
    pub precipitation_chance: i64,
}

/// Forecast for a city resolved by name, with the geocoded coordinates and
/// the derived English city name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityForecast {
    pub city: String,
    pub city_en: String,
    pub coordinates: Coordinates,
    pub forecast: Vec<DailyForecast>,
}
