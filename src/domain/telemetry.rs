// Telemetry data domain models
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Width of a chart bucket and the step of the chart fallbacks.
pub const BUCKET_WIDTH_SECS: i64 = 5 * 60;

/// Retained history per facility.
pub const ROLLING_WINDOW_SECS: i64 = 6 * 60 * 60;

/// Slice fetched on an incremental refresh. Wider than the refresh cadence
/// so provider lag does not leave gaps.
pub const INCREMENTAL_SPAN_SECS: i64 = 10 * 60;

/// A single reading from the historian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: String,
    pub generation: f64,
    pub timestamp: i64,
}

impl ChartPoint {
    pub fn new(time: String, generation: f64, timestamp: i64) -> Self {
        Self {
            time,
            generation,
            timestamp,
        }
    }
}

/// Chart points ordered by timestamp, at most one per timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<ChartPoint>,
}

impl Series {
    /// Build a series from points in any order. On duplicate timestamps the
    /// point that came later in `points` wins.
    pub fn from_points(points: Vec<ChartPoint>) -> Self {
        let mut by_time = std::collections::BTreeMap::new();
        for point in points {
            by_time.insert(point.timestamp, point);
        }
        Self {
            points: by_time.into_values().collect(),
        }
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.last()
    }
}

impl From<Series> for Vec<ChartPoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}

/// Half-open `[start, end)` range of unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// The `span_secs` seconds leading up to `now`.
    pub fn trailing(now: i64, span_secs: i64) -> Self {
        Self {
            start: now - span_secs,
            end: now,
        }
    }
}

/// Response body of the telemetry pass-through endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub chart_data: Series,
    /// Every populated sample, not deduplicated by timestamp.
    pub raw_chart_data: Vec<ChartPoint>,
    pub is_incremental: bool,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelGranularity {
    Minutes,
    Seconds,
}

/// Formats unix timestamps as wall-clock labels ("1:05 PM") in a named
/// timezone, following its daylight-saving rules.
#[derive(Debug, Clone, Copy)]
pub struct TimeLabeler {
    zone: Tz,
}

impl TimeLabeler {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    pub fn label(&self, timestamp: i64, granularity: LabelGranularity) -> String {
        let Some(utc) = DateTime::from_timestamp(timestamp, 0) else {
            return String::new();
        };
        let local = utc.with_timezone(&self.zone);
        match granularity {
            LabelGranularity::Minutes => local.format("%-I:%M %p").to_string(),
            LabelGranularity::Seconds => local.format("%-I:%M:%S %p").to_string(),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
