/// Places and geocoding domain
///
/// Normalizes the places provider's records into the gateway's stable POI
/// schema and serves them through a single ephemeral cache tier.
pub mod gateway;
pub mod normalize;
pub mod provider;

pub use gateway::PlacesGateway;
pub use normalize::normalize_place;
pub use provider::{GoogleMapsClient, PlacesApi, RawGeocodeResult, RawPlace};

use serde::{Deserialize, Serialize};

/// Normalized place record
///
/// Constructed transiently per request from a provider response; only ever
/// persisted as part of a serialized array in the ephemeral cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Provider's stable identifier
    pub external_ref: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    /// 0-5 scale, absent when the provider omits it
    pub rating: Option<f64>,
    pub categories: Vec<String>,
    /// Opaque reference to the first photo, if any
    pub photo_ref: Option<String>,
}

/// Forward geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

/// Point of interest: a PlaceRecord projected onto the interest and city
/// that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub category: String,
    pub city: String,
    pub address: String,
    pub external_ref: String,
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// City information derived from a geocode result
///
/// `name_en` and `country` come from splitting the formatted address on
/// commas, a best-effort heuristic rather than a guaranteed locality parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    pub name: String,
    pub name_en: String,
    pub coordinates: Coordinates,
    pub country: String,
    pub formatted_address: String,
}
