// HTTP request handlers
use crate::application::telemetry_service::FetchMode;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TelemetryQuery {
    #[serde(rename = "slideIndex")]
    pub slide_index: Option<String>,
    pub incremental: Option<String>,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub location: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Fetch a facility's history straight from the historian
pub async fn telemetry_snapshot(
    Query(query): Query<TelemetryQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let facility_id = match query.slide_index.as_deref() {
        Some(raw) => parse_facility_id(raw)?,
        None => 0,
    };
    let facility = state
        .facilities
        .get(facility_id)
        .ok_or(ApiError::InvalidFacility)?;
    let mode = FetchMode::from_flag(query.incremental.as_deref() == Some("true"));

    let snapshot = state
        .telemetry_service
        .snapshot(facility, mode, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!("Telemetry fetch failed for facility {}: {}", facility_id, e);
            ApiError::from(e)
        })?;

    Ok(respond(&snapshot, &headers).await)
}

/// Current conditions for a location, passed through from the provider
pub async fn current_weather(
    Query(query): Query<WeatherQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let location = query
        .location
        .filter(|l| !l.is_empty())
        .ok_or(ApiError::MissingLocation)?;

    let payload = state
        .weather_provider
        .current(&location)
        .await
        .map_err(|e| {
            tracing::error!("Weather fetch failed for {}: {}", location, e);
            ApiError::from(e)
        })?;

    Ok(respond(&payload, &headers).await)
}

/// List configured facilities
pub async fn list_facilities(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    respond(&state.facilities.all(), &headers).await
}

/// Cached dashboard state for one facility
pub async fn facility_dashboard(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let id = parse_facility_id(&id)?;
    let view = state
        .refresh_service
        .view(id)
        .await
        .ok_or(ApiError::InvalidFacility)?;

    Ok(respond(&view, &headers).await)
}

fn parse_facility_id(raw: &str) -> Result<u32, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::InvalidFacility)
}

async fn respond<T: serde::Serialize>(data: &T, headers: &HeaderMap) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
