// Structured error responses
use crate::application::telemetry_repository::TelemetryError;
use crate::application::weather_provider::WeatherError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid facility")]
    InvalidFacility,

    #[error("Location parameter required")]
    MissingLocation,

    #[error("Telemetry credentials not configured")]
    TelemetryNotConfigured,

    #[error("Weather API not configured")]
    WeatherNotConfigured,

    #[error("Weather API error")]
    WeatherUpstream(u16),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFacility | ApiError::MissingLocation => StatusCode::BAD_REQUEST,
            ApiError::WeatherUpstream(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::TelemetryNotConfigured
            | ApiError::WeatherNotConfigured
            | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TelemetryError> for ApiError {
    fn from(error: TelemetryError) -> Self {
        match error {
            TelemetryError::MissingCredentials => ApiError::TelemetryNotConfigured,
            TelemetryError::Provider { .. }
            | TelemetryError::Transport(_)
            | TelemetryError::MalformedResponse(_) => ApiError::Internal,
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(error: WeatherError) -> Self {
        match error {
            WeatherError::MissingApiKey => ApiError::WeatherNotConfigured,
            WeatherError::Provider { status } => ApiError::WeatherUpstream(status),
            WeatherError::Transport(_) | WeatherError::MalformedResponse(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidFacility.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(TelemetryError::MissingCredentials).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(WeatherError::Provider { status: 403 }).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(WeatherError::Provider { status: 42 }).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
