// Synthetic all-zero series used when the historian has nothing to chart
use super::telemetry::{
    BUCKET_WIDTH_SECS, ChartPoint, INCREMENTAL_SPAN_SECS, LabelGranularity, ROLLING_WINDOW_SECS,
    Series, TimeLabeler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroFill {
    pub span_secs: i64,
    pub step_secs: i64,
    pub bucket_width_secs: i64,
    pub granularity: LabelGranularity,
}

impl ZeroFill {
    /// Fallback for a full rolling-window load.
    pub const FULL_WINDOW: ZeroFill = ZeroFill {
        span_secs: ROLLING_WINDOW_SECS,
        step_secs: BUCKET_WIDTH_SECS,
        bucket_width_secs: BUCKET_WIDTH_SECS,
        granularity: LabelGranularity::Minutes,
    };

    /// Fallback for an incremental refresh slice.
    pub const INCREMENTAL: ZeroFill = ZeroFill {
        span_secs: INCREMENTAL_SPAN_SECS,
        step_secs: BUCKET_WIDTH_SECS,
        bucket_width_secs: BUCKET_WIDTH_SECS,
        granularity: LabelGranularity::Minutes,
    };

    /// Fallback for the unbucketed recent-activity view.
    pub const RAW: ZeroFill = ZeroFill {
        span_secs: 5 * 60,
        step_secs: 30,
        bucket_width_secs: 1,
        granularity: LabelGranularity::Seconds,
    };

    pub fn generate(&self, now: i64, labels: &TimeLabeler) -> Series {
        generate_zeros(
            self.span_secs,
            self.step_secs,
            self.bucket_width_secs,
            now,
            labels,
            self.granularity,
        )
    }
}

/// One zero point per `step_secs` tick from `now - span_secs` to `now`
/// inclusive. Timestamps are snapped to the enclosing bucket so the points
/// merge cleanly with real buckets; labels show the unsnapped tick.
pub fn generate_zeros(
    span_secs: i64,
    step_secs: i64,
    bucket_width_secs: i64,
    now: i64,
    labels: &TimeLabeler,
    granularity: LabelGranularity,
) -> Series {
    if step_secs <= 0 || bucket_width_secs <= 0 || span_secs < 0 {
        return Series::default();
    }

    let ticks = span_secs / step_secs;
    let start = now - span_secs;
    let points = (0..=ticks)
        .map(|i| {
            let tick = start + i * step_secs;
            let snapped = tick.div_euclid(bucket_width_secs) * bucket_width_secs;
            ChartPoint::new(labels.label(tick, granularity), 0.0, snapped)
        })
        .collect();

    Series::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_704_114_309;

    #[test]
    fn test_full_window_length() {
        let series = ZeroFill::FULL_WINDOW.generate(NOW, &TimeLabeler::utc());
        assert_eq!(series.len(), 73);
        assert!(series.points().iter().all(|p| p.generation == 0.0));
    }

    #[test]
    fn test_incremental_and_raw_lengths() {
        let labels = TimeLabeler::utc();
        assert_eq!(ZeroFill::INCREMENTAL.generate(NOW, &labels).len(), 3);
        assert_eq!(ZeroFill::RAW.generate(NOW, &labels).len(), 11);
    }

    #[test]
    fn test_length_matches_span_over_step() {
        let labels = TimeLabeler::utc();
        for (span, step) in [(1000, 300), (600, 600), (59, 60), (0, 30)] {
            let series = generate_zeros(span, step, 1, NOW, &labels, LabelGranularity::Minutes);
            assert_eq!(series.len() as i64, span / step + 1, "span {span} step {step}");
        }
    }

    #[test]
    fn test_timestamps_snap_to_buckets() {
        let series = ZeroFill::INCREMENTAL.generate(NOW, &TimeLabeler::utc());
        for point in series.points() {
            assert_eq!(point.timestamp % BUCKET_WIDTH_SECS, 0);
        }
        let last = series.last().unwrap();
        assert_eq!(last.timestamp, NOW - NOW % 300);
    }

    #[test]
    fn test_raw_keeps_second_resolution() {
        let series = ZeroFill::RAW.generate(NOW, &TimeLabeler::utc());
        assert_eq!(series.points()[0].timestamp, NOW - 300);
        assert_eq!(series.last().unwrap().timestamp, NOW);
        assert_eq!(series.last().unwrap().time, "1:05:09 PM");
    }
}
