// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod historian_client;
pub mod http_response;
pub mod weather_client;
