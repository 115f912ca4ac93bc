// Rolling-window merge of chart series
use super::telemetry::{ChartPoint, Series};
use std::collections::BTreeMap;

/// Which side wins when both series carry a point at the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Incoming,
    Existing,
}

/// Merge `incoming` into `existing` and drop everything older than
/// `now - window_secs`.
pub fn merge_series(
    existing: &Series,
    incoming: &Series,
    now: i64,
    window_secs: i64,
    precedence: Precedence,
) -> Series {
    let cutoff = now - window_secs;
    let mut by_time: BTreeMap<i64, ChartPoint> = existing
        .points()
        .iter()
        .filter(|p| p.timestamp >= cutoff)
        .map(|p| (p.timestamp, p.clone()))
        .collect();

    for point in incoming.points().iter().filter(|p| p.timestamp >= cutoff) {
        match precedence {
            Precedence::Incoming => {
                by_time.insert(point.timestamp, point.clone());
            }
            Precedence::Existing => {
                by_time
                    .entry(point.timestamp)
                    .or_insert_with(|| point.clone());
            }
        }
    }

    Series::from_points(by_time.into_values().collect())
}

/// Drop points older than `now - window_secs`.
pub fn prune(series: &Series, now: i64, window_secs: i64) -> Series {
    merge_series(series, &Series::default(), now, window_secs, Precedence::Incoming)
}
