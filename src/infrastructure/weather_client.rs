// Weather provider HTTP client
use crate::application::weather_provider::{WeatherError, WeatherProvider};
use crate::infrastructure::config::WeatherSettings;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(settings: &WeatherSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn build_current_url(base_url: &str, api_key: &str, location: &str) -> String {
    format!(
        "{}?key={}&q={}&aqi=no",
        base_url,
        urlencoding::encode(api_key),
        urlencoding::encode(location)
    )
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current(&self, location: &str) -> Result<serde_json::Value, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = build_current_url(&self.base_url, api_key, location);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!("Weather API error for {}: {}", location, status);
            return Err(WeatherError::Provider { status });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))
    }
}
