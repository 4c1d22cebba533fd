/// Weather API endpoints
use crate::{
    api::{validate_date, validate_text},
    context::AppContext,
    error::{GatewayError, GatewayResult},
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/weather", get(forecast))
        .route("/weather/city", get(forecast_by_city))
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub lat: f64,
    pub lng: f64,
}

async fn forecast(
    State(ctx): State<AppContext>,
    Query(params): Query<ForecastParams>,
) -> GatewayResult<Json<Value>> {
    if !(-90.0..=90.0).contains(&params.lat) {
        return Err(GatewayError::Validation(
            "lat must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&params.lng) {
        return Err(GatewayError::Validation(
            "lng must be between -180 and 180".to_string(),
        ));
    }

    let forecast = ctx.weather.get_forecast(params.lat, params.lng).await?;
    Ok(Json(json!({ "data": forecast })))
}

#[derive(Debug, Deserialize)]
pub struct ForecastByCityParams {
    pub city: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

async fn forecast_by_city(
    State(ctx): State<AppContext>,
    Query(params): Query<ForecastByCityParams>,
) -> GatewayResult<Json<Value>> {
    validate_text("city", &params.city, 200)?;
    if let Some(start) = &params.start_date {
        validate_date("start_date", start)?;
    }
    if let Some(end) = &params.end_date {
        validate_date("end_date", end)?;
    }

    let result = ctx
        .weather
        .get_forecast_by_city(
            &params.city,
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )
        .await?
        .ok_or_else(|| GatewayError::NotFound("City not found".to_string()))?;

    Ok(Json(json!({ "data": result })))
}
