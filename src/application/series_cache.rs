// In-memory rolling-window cache of chart series per facility
use crate::domain::merge::{merge_series, prune, Precedence};
use crate::domain::telemetry::Series;
use std::collections::HashMap;

/// How a completed fetch should be folded into the cached series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesUpdate {
    /// Full-window load: the series replaces whatever was cached.
    Replace(Series),
    /// Incremental slice: new points win on timestamp collisions.
    Merge(Series),
    /// Zero-filled incremental slice: only fills timestamps not yet cached.
    Fill(Series),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Replaced,
    Merged,
    /// A fetch started after this one has already been committed.
    Stale,
}

#[derive(Debug)]
pub struct SeriesCache {
    window_secs: i64,
    series: HashMap<u32, Series>,
    last_update: HashMap<u32, i64>,
    committed_sequence: HashMap<u32, u64>,
}

impl SeriesCache {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window_secs,
            series: HashMap::new(),
            last_update: HashMap::new(),
            committed_sequence: HashMap::new(),
        }
    }

    pub fn get(&self, facility_id: u32) -> Option<&Series> {
        self.series.get(&facility_id)
    }

    pub fn last_update(&self, facility_id: u32) -> Option<i64> {
        self.last_update.get(&facility_id).copied()
    }

    /// True until a non-empty series has been stored for the facility.
    pub fn needs_full_load(&self, facility_id: u32) -> bool {
        self.series
            .get(&facility_id)
            .is_none_or(|series| series.is_empty())
    }

    /// Fold the result of fetch number `sequence` into the cache. Results
    /// older than the last committed fetch for the facility are dropped.
    pub fn commit(
        &mut self,
        facility_id: u32,
        sequence: u64,
        update: SeriesUpdate,
        now: i64,
    ) -> CommitOutcome {
        if let Some(&committed) = self.committed_sequence.get(&facility_id) {
            if sequence < committed {
                return CommitOutcome::Stale;
            }
        }

        let existing = self.series.remove(&facility_id).unwrap_or_default();
        let (next, outcome) = match update {
            SeriesUpdate::Replace(series) => {
                (prune(&series, now, self.window_secs), CommitOutcome::Replaced)
            }
            SeriesUpdate::Merge(slice) => (
                merge_series(&existing, &slice, now, self.window_secs, Precedence::Incoming),
                CommitOutcome::Merged,
            ),
            SeriesUpdate::Fill(slice) => (
                merge_series(&existing, &slice, now, self.window_secs, Precedence::Existing),
                CommitOutcome::Merged,
            ),
        };

        self.series.insert(facility_id, next);
        self.last_update.insert(facility_id, now);
        self.committed_sequence.insert(facility_id, sequence);
        outcome
    }
}
