// Refresh service - Periodic incremental refresh of every dashboard slide
use crate::application::cadence::CadenceGuard;
use crate::application::series_cache::{CommitOutcome, SeriesCache, SeriesUpdate};
use crate::application::telemetry_service::{FetchMode, TelemetryFetch, TelemetryService};
use crate::application::weather_provider::WeatherProvider;
use crate::domain::bucketizer::Processed;
use crate::domain::dashboard::FacilityView;
use crate::domain::facility::{Facility, FacilityRegistry};
use crate::domain::telemetry::ROLLING_WINDOW_SECS;
use crate::domain::weather::WeatherSummary;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
pub struct RefreshIntervals {
    pub telemetry_secs: i64,
    pub weather_secs: i64,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            telemetry_secs: 5 * 60,
            weather_secs: 30 * 60,
        }
    }
}

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RefreshReport {
    pub full_loads: Vec<u32>,
    pub incremental_loads: Vec<u32>,
    pub failed: Vec<u32>,
    pub stale: Vec<u32>,
    pub weather_updated: Vec<String>,
    pub weather_failed: Vec<String>,
}

#[derive(Debug)]
struct DashboardState {
    series: SeriesCache,
    /// Last good provider payload per location.
    weather: HashMap<String, serde_json::Value>,
}

struct Guards {
    telemetry: CadenceGuard<u32>,
    weather: CadenceGuard<String>,
}

pub struct RefreshService {
    telemetry: TelemetryService,
    weather: Arc<dyn WeatherProvider>,
    facilities: Arc<FacilityRegistry>,
    state: RwLock<DashboardState>,
    guards: Mutex<Guards>,
    sequence: AtomicU64,
}

impl RefreshService {
    pub fn new(
        telemetry: TelemetryService,
        weather: Arc<dyn WeatherProvider>,
        facilities: Arc<FacilityRegistry>,
        intervals: RefreshIntervals,
    ) -> Self {
        Self {
            telemetry,
            weather,
            facilities,
            state: RwLock::new(DashboardState {
                series: SeriesCache::new(ROLLING_WINDOW_SECS),
                weather: HashMap::new(),
            }),
            guards: Mutex::new(Guards {
                telemetry: CadenceGuard::new(intervals.telemetry_secs),
                weather: CadenceGuard::new(intervals.weather_secs),
            }),
            sequence: AtomicU64::new(0),
        }
    }

    /// Refresh every facility and weather location whose cadence has
    /// elapsed. Fetches run concurrently; results are committed together
    /// once all of them have finished. Failures leave the cached state
    /// untouched.
    pub async fn tick(&self, now: DateTime<Utc>) -> RefreshReport {
        let now_secs = now.timestamp();
        let (due_facilities, due_locations) = self.claim_due(now_secs);
        if due_facilities.is_empty() && due_locations.is_empty() {
            return RefreshReport::default();
        }

        let jobs: Vec<(&Facility, FetchMode, u64)> = {
            let state = self.state.read().await;
            due_facilities
                .into_iter()
                .map(|facility| {
                    let mode = FetchMode::from_flag(!state.series.needs_full_load(facility.id));
                    (facility, mode, self.sequence.fetch_add(1, Ordering::SeqCst))
                })
                .collect()
        };

        let telemetry_fetches = join_all(jobs.into_iter().map(|(facility, mode, sequence)| async move {
            let result = self.telemetry.fetch(facility, mode, now).await;
            (facility.id, sequence, result)
        }));
        let weather_fetches = join_all(due_locations.into_iter().map(|location| async move {
            let result = self.weather.current(&location).await;
            (location, result)
        }));
        let (telemetry_results, weather_results) = tokio::join!(telemetry_fetches, weather_fetches);

        let mut report = RefreshReport::default();
        let mut state = self.state.write().await;

        for (facility_id, sequence, result) in telemetry_results {
            let fetch = match result {
                Ok(fetch) => fetch,
                Err(e) => {
                    tracing::warn!(
                        "Refresh failed for facility {}, keeping cached series: {}",
                        facility_id,
                        e
                    );
                    report.failed.push(facility_id);
                    continue;
                }
            };

            let mode = fetch.mode;
            match state.series.commit(facility_id, sequence, series_update(fetch), now_secs) {
                CommitOutcome::Stale => {
                    tracing::debug!("Discarded out-of-order fetch {} for facility {}", sequence, facility_id);
                    report.stale.push(facility_id);
                }
                CommitOutcome::Replaced | CommitOutcome::Merged => {
                    let points = state.series.get(facility_id).map_or(0, |s| s.len());
                    tracing::info!(
                        "Refreshed facility {} ({:?}): {} points cached",
                        facility_id,
                        mode,
                        points
                    );
                    match mode {
                        FetchMode::Full => report.full_loads.push(facility_id),
                        FetchMode::Incremental => report.incremental_loads.push(facility_id),
                    }
                }
            }
        }

        for (location, result) in weather_results {
            match result {
                Ok(payload) => {
                    state.weather.insert(location.clone(), payload);
                    report.weather_updated.push(location);
                }
                Err(e) => {
                    tracing::warn!("Weather refresh failed for {}: {}", location, e);
                    report.weather_failed.push(location);
                }
            }
        }

        report
    }

    /// Cached state for one facility; never touches the upstream providers.
    pub async fn view(&self, facility_id: u32) -> Option<FacilityView> {
        let facility = self.facilities.get(facility_id)?;
        let state = self.state.read().await;

        let chart_data = state.series.get(facility_id).cloned().unwrap_or_default();
        let weather = facility
            .weather_location
            .as_ref()
            .and_then(|location| state.weather.get(location))
            .and_then(WeatherSummary::from_payload);

        Some(FacilityView::new(
            facility.clone(),
            chart_data,
            state.series.last_update(facility_id).map(|secs| secs * 1000),
            weather,
        ))
    }

    fn claim_due(&self, now_secs: i64) -> (Vec<&Facility>, Vec<String>) {
        let mut guards = match self.guards.lock() {
            Ok(guards) => guards,
            Err(poisoned) => poisoned.into_inner(),
        };

        let facilities = self
            .facilities
            .all()
            .iter()
            .filter(|facility| guards.telemetry.try_acquire(&facility.id, now_secs))
            .collect();
        let locations = self
            .facilities
            .weather_locations()
            .into_iter()
            .filter(|location| guards.weather.try_acquire(location, now_secs))
            .collect();

        (facilities, locations)
    }
}

fn series_update(fetch: TelemetryFetch) -> SeriesUpdate {
    match (fetch.mode, fetch.chart) {
        (FetchMode::Full, chart) => SeriesUpdate::Replace(chart.into_series()),
        (FetchMode::Incremental, Processed::Ok(series)) => SeriesUpdate::Merge(series),
        (FetchMode::Incremental, Processed::Fallback { series, .. }) => SeriesUpdate::Fill(series),
    }
}
