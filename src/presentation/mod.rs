// Presentation layer - HTTP routes
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_weather, facility_dashboard, health_check, list_facilities, telemetry_snapshot,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/telemetry", get(telemetry_snapshot))
        .route("/api/weather", get(current_weather))
        .route("/api/facilities", get(list_facilities))
        .route("/api/dashboard/:id", get(facility_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_service::{RefreshIntervals, RefreshService};
    use crate::application::telemetry_repository::{FetchedHistory, TelemetryError};
    use crate::application::telemetry_service::tests::FakeRepository;
    use crate::application::telemetry_service::TelemetryService;
    use crate::application::weather_provider::{WeatherError, WeatherProvider};
    use crate::domain::facility::{Facility, FacilityRegistry};
    use crate::domain::telemetry::{Sample, TimeLabeler};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedWeather(Result<Value, WeatherError>);

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn current(&self, _location: &str) -> Result<Value, WeatherError> {
            self.0.clone()
        }
    }

    fn app(
        telemetry: Result<FetchedHistory, TelemetryError>,
        weather: Result<Value, WeatherError>,
    ) -> Router {
        let facilities = Arc::new(FacilityRegistry::new(vec![
            Facility::new(0, "Wind", "wind", 1e-6, Some("83427")),
            Facility::new(1, "Hunter", "hunter", 1.0, None),
        ]));
        let telemetry_service = TelemetryService::new(
            Arc::new(FakeRepository::returning(telemetry)),
            TimeLabeler::utc(),
        );
        let weather_provider: Arc<dyn WeatherProvider> = Arc::new(FixedWeather(weather));
        let refresh_service = Arc::new(RefreshService::new(
            telemetry_service.clone(),
            weather_provider.clone(),
            facilities.clone(),
            RefreshIntervals::default(),
        ));

        router(Arc::new(AppState {
            facilities,
            telemetry_service,
            weather_provider,
            refresh_service,
        }))
    }

    fn ok_history() -> Result<FetchedHistory, TelemetryError> {
        let now = chrono::Utc::now().timestamp();
        Ok(FetchedHistory {
            samples: vec![Sample::new(now - 60, Some(2_500_000.0))],
            pages: 1,
            ..Default::default()
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(ok_history(), Ok(json!({})))
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_telemetry_snapshot() {
        let (status, body) = get(
            app(ok_history(), Ok(json!({}))),
            "/api/telemetry?slideIndex=0&incremental=true",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isIncremental"], true);
        assert_eq!(body["chartData"][0]["generation"], 2.5);
        assert_eq!(body["rawChartData"].as_array().unwrap().len(), 1);
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_telemetry_defaults_to_first_facility_full_load() {
        let (status, body) = get(app(ok_history(), Ok(json!({}))), "/api/telemetry").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isIncremental"], false);
    }

    #[tokio::test]
    async fn test_unknown_facility_is_bad_request() {
        let (status, body) = get(
            app(ok_history(), Ok(json!({}))),
            "/api/telemetry?slideIndex=9",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid facility"}));
    }

    #[tokio::test]
    async fn test_malformed_facility_id_is_bad_request() {
        for uri in [
            "/api/telemetry?slideIndex=abc",
            "/api/telemetry?slideIndex=-1",
            "/api/dashboard/abc",
        ] {
            let (status, body) = get(app(ok_history(), Ok(json!({}))), uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"error": "Invalid facility"}), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let (status, body) = get(
            app(Err(TelemetryError::MissingCredentials), Ok(json!({}))),
            "/api/telemetry?slideIndex=1",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Telemetry credentials not configured"}));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let (status, body) = get(
            app(Err(TelemetryError::Provider { status: 503 }), Ok(json!({}))),
            "/api/telemetry?slideIndex=1",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_weather_pass_through() {
        let payload = json!({"location": {"name": "Veyo"}, "current": {"temp_f": 71.0}});

        let (status, body) = get(app(ok_history(), Ok(payload.clone())), "/api/weather?location=84782").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_weather_errors() {
        let (status, _) = get(app(ok_history(), Ok(json!({}))), "/api/weather").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(
            app(ok_history(), Err(WeatherError::MissingApiKey)),
            "/api/weather?location=84782",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Weather API not configured"}));

        let (status, body) = get(
            app(ok_history(), Err(WeatherError::Provider { status: 401 })),
            "/api/weather?location=84782",
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Weather API error"}));
    }

    #[tokio::test]
    async fn test_facilities_and_dashboard_view() {
        let (status, body) = get(app(ok_history(), Ok(json!({}))), "/api/facilities").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["name"], "Hunter");

        let (status, body) = get(app(ok_history(), Ok(json!({}))), "/api/dashboard/0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentGeneration"], "N/A");
        assert!(body["chartData"].as_array().unwrap().is_empty());

        let (status, _) = get(app(ok_history(), Ok(json!({}))), "/api/dashboard/5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
