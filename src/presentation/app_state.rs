// Application state for HTTP handlers
use crate::application::refresh_service::RefreshService;
use crate::application::telemetry_service::TelemetryService;
use crate::application::weather_provider::WeatherProvider;
use crate::domain::facility::FacilityRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub facilities: Arc<FacilityRegistry>,
    pub telemetry_service: TelemetryService,
    pub weather_provider: Arc<dyn WeatherProvider>,
    pub refresh_service: Arc<RefreshService>,
}
