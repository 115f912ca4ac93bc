// Provider trait for current weather conditions
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeatherError {
    #[error("weather API key not configured")]
    MissingApiKey,

    #[error("weather provider returned status {status}")]
    Provider { status: u16 },

    #[error("weather request failed: {0}")]
    Transport(String),

    #[error("malformed weather response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// The provider's current-conditions payload for `location`, unmodified.
    async fn current(&self, location: &str) -> Result<serde_json::Value, WeatherError>;
}
