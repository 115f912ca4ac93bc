// Repository trait for historian access
use crate::domain::telemetry::{Sample, TimeRange};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("telemetry credentials not configured")]
    MissingCredentials,

    #[error("telemetry provider returned status {status}")]
    Provider { status: u16 },

    #[error("telemetry request failed: {0}")]
    Transport(String),

    #[error("malformed telemetry response: {0}")]
    MalformedResponse(String),
}

/// Every row of one historian query, accumulated across pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedHistory {
    pub samples: Vec<Sample>,
    pub pages: usize,
    /// Rows that were not `[timestamp, value]` pairs.
    pub skipped_rows: usize,
    /// The page limit was hit while the provider still offered more pages.
    pub truncated: bool,
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// All samples of `point_name` in `range`, ascending by timestamp.
    async fn fetch_history(
        &self,
        point_name: &str,
        range: TimeRange,
    ) -> Result<FetchedHistory, TelemetryError>;
}
