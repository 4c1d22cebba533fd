/// Calendar API endpoints
///
/// OAuth connect/callback plumbing plus event creation. The user id rides
/// through the OAuth flow in the `state` parameter.
use crate::{
    api::{validate_date, validate_text},
    context::AppContext,
    error::{GatewayError, GatewayResult},
};
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/calendar/google/connect", get(connect))
        .route("/calendar/google/callback", get(callback))
        .route("/calendar/status", get(status))
        .route("/calendar/events", post(create_event))
}

fn parse_user_id(value: &str) -> GatewayResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| GatewayError::Validation("userId must be a UUID".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParams {
    pub user_id: String,
}

async fn connect(
    State(ctx): State<AppContext>,
    Query(params): Query<UserIdParams>,
) -> GatewayResult<Redirect> {
    let user_id = parse_user_id(&params.user_id)?;
    Ok(Redirect::temporary(&ctx.calendar.connect_url(user_id)))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    /// User id threaded through the OAuth flow
    pub state: String,
}

async fn callback(
    State(ctx): State<AppContext>,
    Query(params): Query<CallbackParams>,
) -> GatewayResult<&'static str> {
    validate_text("code", &params.code, 500)?;
    let user_id = parse_user_id(&params.state)?;

    ctx.calendar.complete_connect(user_id, &params.code).await?;
    Ok("Calendar connected successfully. You can close this window.")
}

async fn status(
    State(ctx): State<AppContext>,
    Query(params): Query<UserIdParams>,
) -> GatewayResult<Json<Value>> {
    let user_id = parse_user_id(&params.user_id)?;
    let connected = ctx.calendar.is_connected(user_id).await?;
    Ok(Json(json!({ "connected": connected })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub user_id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Option<String>,
}

async fn create_event(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateEventRequest>,
) -> GatewayResult<Json<Value>> {
    let user_id = parse_user_id(&req.user_id)?;
    validate_text("title", &req.title, 200)?;
    validate_date("startDate", &req.start_date)?;
    validate_date("endDate", &req.end_date)?;
    if let Some(description) = &req.description {
        if description.len() > 1000 {
            return Err(GatewayError::Validation(
                "description too long (max 1000 characters)".to_string(),
            ));
        }
    }

    let created = ctx
        .calendar
        .create_event(
            user_id,
            &crate::calendar::EventInput {
                title: req.title,
                description: req.description,
                start_date: req.start_date,
                end_date: req.end_date,
            },
        )
        .await?;

    Ok(Json(json!({
        "data": {
            "eventId": created.event_id,
            "link": created.link
        }
    })))
}
