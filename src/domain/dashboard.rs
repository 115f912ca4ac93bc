// Dashboard domain model
use super::facility::Facility;
use super::telemetry::Series;
use super::weather::WeatherSummary;
use serde::Serialize;

/// Cached state of one dashboard slide.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityView {
    pub facility: Facility,
    pub chart_data: Series,
    pub current_generation: String,
    /// Unix milliseconds of the last committed refresh, like
    /// `TelemetrySnapshot::timestamp`.
    pub last_updated: Option<i64>,
    pub weather: Option<WeatherSummary>,
}

impl FacilityView {
    pub fn new(
        facility: Facility,
        chart_data: Series,
        last_updated: Option<i64>,
        weather: Option<WeatherSummary>,
    ) -> Self {
        let current_generation = current_generation(&chart_data);
        Self {
            facility,
            chart_data,
            current_generation,
            last_updated,
            weather,
        }
    }
}

/// Latest chart value as "<value> MW", or "N/A" with no data yet.
pub fn current_generation(series: &Series) -> String {
    match series.last() {
        Some(point) => format!("{} MW", point.generation),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::ChartPoint;

    #[test]
    fn test_current_generation() {
        assert_eq!(current_generation(&Series::default()), "N/A");

        let series = Series::from_points(vec![
            ChartPoint::new("1:00 PM".into(), 3.5, 300),
            ChartPoint::new("1:05 PM".into(), 42.0, 600),
        ]);
        assert_eq!(current_generation(&series), "42 MW");
    }
}
