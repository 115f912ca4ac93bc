use crate::application::pagination::DEFAULT_MAX_PAGES;
use crate::application::refresh_service::RefreshIntervals;
use crate::domain::facility::{Facility, FacilityRegistry};
use crate::domain::telemetry::TimeLabeler;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;

/// Historian query for one point over a half-open range.
pub const DEFAULT_QUERY_TEMPLATE: &str = "select timestamp, \"${point}\" from history where timestamp >= ${start} and timestamp < ${end} order by timestamp asc";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub historian: HistorianSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub facilities: Vec<Facility>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistorianSettings {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_query_template")]
    pub query_template: String,
}

impl Default for HistorianSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            max_pages: default_max_pages(),
            query_template: default_query_template(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_telemetry_interval")]
    pub telemetry_interval_secs: u64,
    #[serde(default = "default_weather_interval")]
    pub weather_interval_secs: u64,
    /// How often the refresh timer fires; each facility is still limited by
    /// its own interval.
    #[serde(default = "default_tick")]
    pub tick_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            telemetry_interval_secs: default_telemetry_interval(),
            weather_interval_secs: default_weather_interval(),
            tick_secs: default_tick(),
        }
    }
}

impl RefreshSettings {
    pub fn intervals(&self) -> RefreshIntervals {
        RefreshIntervals {
            telemetry_secs: self.telemetry_interval_secs as i64,
            weather_secs: self.weather_interval_secs as i64,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    /// IANA timezone used for chart labels, e.g. "America/Denver".
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_query_template() -> String {
    DEFAULT_QUERY_TEMPLATE.to_string()
}

fn default_weather_url() -> String {
    "http://api.weatherapi.com/v1/current.json".to_string()
}

fn default_telemetry_interval() -> u64 {
    5 * 60
}

fn default_weather_interval() -> u64 {
    30 * 60
}

fn default_tick() -> u64 {
    30
}

impl DashboardConfig {
    fn validate(self) -> anyhow::Result<Self> {
        if self.historian.max_pages == 0 {
            anyhow::bail!("historian.max_pages must be at least 1");
        }
        if self.refresh.telemetry_interval_secs == 0
            || self.refresh.weather_interval_secs == 0
            || self.refresh.tick_secs == 0
        {
            anyhow::bail!("refresh intervals must be greater than zero");
        }
        self.labels()?;
        Ok(self)
    }

    pub fn labels(&self) -> anyhow::Result<TimeLabeler> {
        let name = &self.display.timezone;
        let zone: Tz = name
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid display.timezone {:?}: {}", name, e))?;
        Ok(TimeLabeler::new(zone))
    }

    /// Configured facilities, or the built-in table when none are listed.
    pub fn facility_registry(&self) -> FacilityRegistry {
        if self.facilities.is_empty() {
            FacilityRegistry::default()
        } else {
            FacilityRegistry::new(self.facilities.clone())
        }
    }
}

/// Load `config/dashboard.*` (optional) overlaid with `DASHBOARD__*`
/// environment variables, e.g. `DASHBOARD__HISTORIAN__PASSWORD`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<DashboardConfig>()?.validate()
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
