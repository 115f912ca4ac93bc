// Telemetry service - Fetch a facility's history and shape it for charts
use crate::application::telemetry_repository::{TelemetryError, TelemetryRepository};
use crate::domain::bucketizer::{Bucketizer, Processed};
use crate::domain::facility::Facility;
use crate::domain::telemetry::{
    BUCKET_WIDTH_SECS, ChartPoint, INCREMENTAL_SPAN_SECS, ROLLING_WINDOW_SECS, TelemetrySnapshot,
    TimeLabeler, TimeRange,
};
use crate::domain::zero_fill::ZeroFill;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// The whole rolling window.
    Full,
    /// Only the most recent slice.
    Incremental,
}

impl FetchMode {
    pub fn from_flag(incremental: bool) -> Self {
        if incremental {
            FetchMode::Incremental
        } else {
            FetchMode::Full
        }
    }

    pub fn span_secs(self) -> i64 {
        match self {
            FetchMode::Full => ROLLING_WINDOW_SECS,
            FetchMode::Incremental => INCREMENTAL_SPAN_SECS,
        }
    }

    pub fn zero_fill(self) -> ZeroFill {
        match self {
            FetchMode::Full => ZeroFill::FULL_WINDOW,
            FetchMode::Incremental => ZeroFill::INCREMENTAL,
        }
    }

    pub fn is_incremental(self) -> bool {
        self == FetchMode::Incremental
    }
}

/// Bucketed and raw views of one historian fetch.
#[derive(Debug, Clone)]
pub struct TelemetryFetch {
    pub mode: FetchMode,
    pub chart: Processed,
    pub raw: Processed<Vec<ChartPoint>>,
}

impl TelemetryFetch {
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            chart_data: self.chart.into_series(),
            raw_chart_data: self.raw.into_series(),
            is_incremental: self.mode.is_incremental(),
            timestamp: fetched_at.timestamp_millis(),
        }
    }
}

#[derive(Clone)]
pub struct TelemetryService {
    repository: Arc<dyn TelemetryRepository>,
    labels: TimeLabeler,
}

impl TelemetryService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, labels: TimeLabeler) -> Self {
        Self { repository, labels }
    }

    /// Fetch `facility`'s history for `mode` ending at `now`. A malformed
    /// upstream payload is replaced by zero-filled series; provider and
    /// credential failures are returned.
    pub async fn fetch(
        &self,
        facility: &Facility,
        mode: FetchMode,
        now: DateTime<Utc>,
    ) -> Result<TelemetryFetch, TelemetryError> {
        let now_secs = now.timestamp();
        let range = TimeRange::trailing(now_secs, mode.span_secs());

        let history = match self.repository.fetch_history(&facility.point_name, range).await {
            Ok(history) => {
                tracing::debug!(
                    "Facility {}: {} samples over {} pages ({} rows skipped, truncated: {})",
                    facility.id,
                    history.samples.len(),
                    history.pages,
                    history.skipped_rows,
                    history.truncated
                );
                Some(history)
            }
            Err(TelemetryError::MalformedResponse(reason)) => {
                tracing::warn!(
                    "Malformed history for facility {}: {}",
                    facility.id,
                    reason
                );
                None
            }
            Err(e) => return Err(e),
        };
        let rows = history.as_ref().map(|h| h.samples.as_slice());

        let bucketizer = Bucketizer::new(BUCKET_WIDTH_SECS, facility.unit_scale_factor, self.labels);
        let chart = bucketizer.process(rows, mode.zero_fill(), now_secs);
        let raw = bucketizer.process_raw(rows, now_secs);

        if let Some(reason) = chart.fallback_reason() {
            tracing::warn!(
                "Zero-filling {:?} chart for facility {}: {}",
                mode,
                facility.id,
                reason
            );
        }

        Ok(TelemetryFetch { mode, chart, raw })
    }

    pub async fn snapshot(
        &self,
        facility: &Facility,
        mode: FetchMode,
        now: DateTime<Utc>,
    ) -> Result<TelemetrySnapshot, TelemetryError> {
        let fetch = self.fetch(facility, mode, now).await?;
        Ok(fetch.into_snapshot(Utc::now()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::telemetry_repository::FetchedHistory;
    use crate::domain::bucketizer::FallbackReason;
    use crate::domain::telemetry::Sample;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Repository returning one canned result and recording requested ranges.
    pub(crate) struct FakeRepository {
        pub result: Mutex<Result<FetchedHistory, TelemetryError>>,
        pub ranges: Mutex<Vec<(String, TimeRange)>>,
    }

    impl FakeRepository {
        pub(crate) fn returning(result: Result<FetchedHistory, TelemetryError>) -> Self {
            Self {
                result: Mutex::new(result),
                ranges: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_samples(samples: Vec<Sample>) -> Self {
            Self::returning(Ok(FetchedHistory {
                samples,
                pages: 1,
                ..Default::default()
            }))
        }
    }

    #[async_trait]
    impl TelemetryRepository for FakeRepository {
        async fn fetch_history(
            &self,
            point_name: &str,
            range: TimeRange,
        ) -> Result<FetchedHistory, TelemetryError> {
            self.ranges
                .lock()
                .unwrap()
                .push((point_name.to_string(), range));
            self.result.lock().unwrap().clone()
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_114_309, 0).unwrap()
    }

    fn facility() -> Facility {
        Facility::new(0, "Horse Butte Wind", "HBW:Value", 1e-6, None)
    }

    #[tokio::test]
    async fn test_full_fetch_requests_rolling_window() {
        let repo = Arc::new(FakeRepository::with_samples(vec![
            Sample::new(1_704_114_000, Some(4_000_000.0)),
            Sample::new(1_704_114_100, Some(-2_000_000.0)),
        ]));
        let service = TelemetryService::new(repo.clone(), TimeLabeler::utc());

        let fetch = service.fetch(&facility(), FetchMode::Full, now()).await.unwrap();

        let ranges = repo.ranges.lock().unwrap().clone();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].0, "HBW:Value");
        assert_eq!(ranges[0].1, TimeRange { start: 1_704_114_309 - 21_600, end: 1_704_114_309 });

        assert_eq!(fetch.chart.fallback_reason(), None);
        let chart = fetch.chart.series().points();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].timestamp, 1_704_114_000);
        assert_eq!(chart[0].generation, 3.0);
        assert_eq!(fetch.raw.series().len(), 2);
    }

    #[tokio::test]
    async fn test_incremental_fetch_requests_recent_slice() {
        let repo = Arc::new(FakeRepository::with_samples(Vec::new()));
        let service = TelemetryService::new(repo.clone(), TimeLabeler::utc());

        let fetch = service
            .fetch(&facility(), FetchMode::Incremental, now())
            .await
            .unwrap();

        let range = repo.ranges.lock().unwrap()[0].1;
        assert_eq!(range.end - range.start, 600);
        assert_eq!(fetch.chart.fallback_reason(), Some(FallbackReason::NoValues));
        assert_eq!(fetch.chart.series().len(), 3);
        assert_eq!(fetch.raw.series().len(), 11);
    }

    #[tokio::test]
    async fn test_malformed_response_is_zero_filled() {
        let repo = Arc::new(FakeRepository::returning(Err(
            TelemetryError::MalformedResponse("expected object".into()),
        )));
        let service = TelemetryService::new(repo, TimeLabeler::utc());

        let snapshot = service
            .snapshot(&facility(), FetchMode::Full, now())
            .await
            .unwrap();

        assert_eq!(snapshot.chart_data.len(), 73);
        assert!(!snapshot.is_incremental);
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let repo = Arc::new(FakeRepository::returning(Err(TelemetryError::Provider {
            status: 401,
        })));
        let service = TelemetryService::new(repo, TimeLabeler::utc());

        let result = service.fetch(&facility(), FetchMode::Incremental, now()).await;

        assert!(matches!(result, Err(TelemetryError::Provider { status: 401 })));
    }
}
