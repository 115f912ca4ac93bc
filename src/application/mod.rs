// Application layer - Use cases over the telemetry and weather providers
pub mod cadence;
pub mod pagination;
pub mod refresh_service;
pub mod series_cache;
pub mod telemetry_repository;
pub mod telemetry_service;
pub mod weather_provider;
