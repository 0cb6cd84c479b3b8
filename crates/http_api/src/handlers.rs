use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};
use grouping::GroupingPreferences;
use monitor_app::Result as AppResult;
use serde_json::Value;

use app_api::{
    BlocksRequest, DailyRequest, GroupedRequest, HistoricalRequest, PostEventRequest,
    PresetRequest, RecentRequest, StreamMessage,
};

use crate::{errors::HttpError, state::HttpState};

/// Runs a transcript scan off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, HttpError>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

pub async fn post_event(
    State(state): State<HttpState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, HttpError> {
    let req = PostEventRequest::from_json(body)?;
    let saved = app_api::post_event(&state.context, req)?;
    let delivered = state
        .broadcaster
        .publish(&StreamMessage::Event(saved.clone()));
    tracing::debug!(id = saved.id, delivered, "broadcast hook event");
    Ok(Json(saved))
}

pub async fn recent_events(
    State(state): State<HttpState>,
    Query(req): Query<RecentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::recent_events(&state.context, req)?;
    Ok(Json(response))
}

pub async fn historical_events(
    State(state): State<HttpState>,
    Query(req): Query<HistoricalRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::historical_events(&state.context, req)?;
    Ok(Json(response))
}

pub async fn filter_options(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::filter_options(&state.context)?;
    Ok(Json(response))
}

pub async fn grouped_events(
    State(state): State<HttpState>,
    Query(req): Query<GroupedRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::grouped_events(&state.context, req)?;
    Ok(Json(response))
}

pub async fn preferences_get(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::preferences_get(&state.context)?;
    Ok(Json(response))
}

pub async fn preferences_put(
    State(state): State<HttpState>,
    Json(prefs): Json<GroupingPreferences>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::preferences_put(&state.context, prefs)?;
    Ok(Json(response))
}

pub async fn preferences_preset(
    State(state): State<HttpState>,
    Json(req): Json<PresetRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::preferences_preset(&state.context, req)?;
    Ok(Json(response))
}

pub async fn usage_blocks(
    State(state): State<HttpState>,
    Query(req): Query<BlocksRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let ctx = state.context.clone();
    let response = blocking(move || app_api::usage_blocks(&ctx, req)).await?;
    Ok(Json(response))
}

pub async fn usage_live(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let ctx = state.context.clone();
    let response = blocking(move || Ok(app_api::usage_live(&ctx))).await?;
    Ok(Json(response))
}

pub async fn usage_daily(
    State(state): State<HttpState>,
    Query(req): Query<DailyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let ctx = state.context.clone();
    let response = blocking(move || app_api::usage_daily(&ctx, req)).await?;
    Ok(Json(response))
}
