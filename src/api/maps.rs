/// Maps API endpoints
///
/// Thin layer over the places gateway: request-shape validation, the
/// `{"data": ...}` envelope, and absent-result → 404 mapping.
use crate::{
    api::validate_text,
    context::AppContext,
    error::{GatewayError, GatewayResult},
};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/maps/search", get(search))
        .route("/maps/geocode", get(geocode))
        .route("/maps/pois", post(search_pois))
        .route("/maps/city", get(city_info))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> GatewayResult<Json<Value>> {
    validate_text("q", &params.q, 200)?;

    let places = ctx.places.search_places(&params.q).await?;
    Ok(Json(json!({ "data": places })))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
}

async fn geocode(
    State(ctx): State<AppContext>,
    Query(params): Query<GeocodeParams>,
) -> GatewayResult<Json<Value>> {
    validate_text("address", &params.address, 500)?;

    let location = ctx
        .places
        .geocode(&params.address)
        .await?
        .ok_or_else(|| GatewayError::NotFound("Address not found".to_string()))?;

    Ok(Json(json!({ "data": location })))
}

#[derive(Debug, Deserialize)]
pub struct SearchPoisRequest {
    pub city: String,
    pub interests: Vec<String>,
}

async fn search_pois(
    State(ctx): State<AppContext>,
    Json(req): Json<SearchPoisRequest>,
) -> GatewayResult<Json<Value>> {
    validate_text("city", &req.city, 200)?;
    if req.interests.is_empty() {
        return Err(GatewayError::Validation(
            "interests cannot be empty".to_string(),
        ));
    }
    for interest in &req.interests {
        validate_text("interest", interest, 200)?;
    }

    let pois = ctx.places.search_pois(&req.city, &req.interests).await?;
    Ok(Json(json!({ "data": pois })))
}

#[derive(Debug, Deserialize)]
pub struct CityInfoParams {
    pub city: String,
}

async fn city_info(
    State(ctx): State<AppContext>,
    Query(params): Query<CityInfoParams>,
) -> GatewayResult<Json<Value>> {
    validate_text("city", &params.city, 200)?;

    let info = ctx
        .places
        .city_info(&params.city)
        .await?
        .ok_or_else(|| GatewayError::NotFound("City not found".to_string()))?;

    Ok(Json(json!({ "data": info })))
}
