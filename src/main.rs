// Main entry point - Dependency injection, refresh timer and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use crate::application::refresh_service::RefreshService;
use crate::application::telemetry_service::TelemetryService;
use crate::application::weather_provider::WeatherProvider;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::historian_client::HistorianClient;
use crate::infrastructure::weather_client::WeatherClient;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let labels = config.labels()?;
    let facilities = Arc::new(config.facility_registry());

    // Create provider clients (infrastructure layer)
    let historian = HistorianClient::new(&config.historian);
    if !historian.has_credentials() {
        tracing::warn!("Historian credentials not configured; telemetry requests will fail");
    }
    let weather = WeatherClient::new(&config.weather);
    if !weather.has_api_key() {
        tracing::warn!("Weather API key not configured; weather requests will fail");
    }

    // Create services (application layer)
    let telemetry_service = TelemetryService::new(Arc::new(historian), labels);
    let weather_provider: Arc<dyn WeatherProvider> = Arc::new(weather);
    let refresh_service = Arc::new(RefreshService::new(
        telemetry_service.clone(),
        weather_provider.clone(),
        facilities.clone(),
        config.refresh.intervals(),
    ));

    // Recurring refresh timer; each facility is rate limited by the service
    let tick_every = Duration::from_secs(config.refresh.tick_secs);
    let refresher = refresh_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let report = refresher.tick(Utc::now()).await;
            tracing::debug!(
                full = report.full_loads.len(),
                incremental = report.incremental_loads.len(),
                failed = report.failed.len(),
                stale = report.stale.len(),
                weather_updated = report.weather_updated.len(),
                weather_failed = report.weather_failed.len(),
                "Refresh tick complete"
            );
        }
    });

    // Create application state
    let state = Arc::new(AppState {
        facilities,
        telemetry_service,
        weather_provider,
        refresh_service,
    });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind address {}", config.server.bind))?;
    tracing::info!("Starting generation-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
