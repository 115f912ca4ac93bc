// Weather domain model
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display-ready current conditions for a dashboard slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub city: String,
    pub temp: String,
    pub condition: String,
    pub wind: String,
    pub humidity: String,
    pub precip: String,
    pub last_update: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    location: PayloadLocation,
    current: PayloadCurrent,
}

#[derive(Debug, Deserialize)]
struct PayloadLocation {
    name: String,
    region: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct PayloadCurrent {
    temp_f: f64,
    condition: PayloadCondition,
    wind_mph: f64,
    humidity: f64,
    precip_in: f64,
}

#[derive(Debug, Deserialize)]
struct PayloadCondition {
    text: String,
    icon: String,
}

impl WeatherSummary {
    /// Summarize a provider payload. Returns `None` when the payload lacks
    /// the location or current-conditions sections.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let payload = WeatherPayload::deserialize(payload).ok()?;

        Some(Self {
            city: format!("{}, {}", payload.location.name, payload.location.region),
            temp: format!("{}°F", payload.current.temp_f.round() as i64),
            condition: payload.current.condition.text,
            wind: format!("{} mph", payload.current.wind_mph.round() as i64),
            humidity: format!("{}%", payload.current.humidity),
            precip: format!("{}\"", payload.current.precip_in),
            last_update: format_local_time(&payload.location.localtime),
            icon: payload.current.condition.icon.replace("64x64", "128x128"),
        })
    }
}

fn format_local_time(localtime: &str) -> String {
    match NaiveDateTime::parse_from_str(localtime, "%Y-%m-%d %H:%M") {
        Ok(time) => time.format("%b %-d, %-I:%M %p").to_string(),
        Err(_) => "Unknown".to_string(),
    }
}
