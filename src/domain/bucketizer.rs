// Downsampling of historian samples into fixed-width chart buckets
use super::telemetry::{round2, ChartPoint, LabelGranularity, Sample, Series, TimeLabeler};
use super::zero_fill::ZeroFill;
use std::collections::BTreeMap;

/// Why a zero-filled series was substituted for real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The upstream payload could not be decoded.
    MalformedResponse,
    /// The payload decoded but carried no rows.
    NoValues,
    /// Every row had a null value.
    NoPopulatedPoints,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FallbackReason::MalformedResponse => "malformed response",
            FallbackReason::NoValues => "no values",
            FallbackReason::NoPopulatedPoints => "no populated points",
        };
        f.write_str(text)
    }
}

/// Result of turning historian rows into chart data. `S` is [`Series`] for
/// the bucketed view and a plain point list for the raw view.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed<S = Series> {
    Ok(S),
    Fallback { series: S, reason: FallbackReason },
}

impl<S> Processed<S> {
    pub fn series(&self) -> &S {
        match self {
            Processed::Ok(series) | Processed::Fallback { series, .. } => series,
        }
    }

    pub fn into_series(self) -> S {
        match self {
            Processed::Ok(series) | Processed::Fallback { series, .. } => series,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Processed::Ok(_) => None,
            Processed::Fallback { reason, .. } => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bucketizer {
    bucket_width_secs: i64,
    unit_scale_factor: f64,
    labels: TimeLabeler,
}

impl Bucketizer {
    pub fn new(bucket_width_secs: i64, unit_scale_factor: f64, labels: TimeLabeler) -> Self {
        Self {
            bucket_width_secs: bucket_width_secs.max(1),
            unit_scale_factor,
            labels,
        }
    }

    /// Average samples per bucket. Null values are dropped and negative
    /// readings count by magnitude. May return an empty series.
    pub fn bucketize(&self, samples: &[Sample]) -> Series {
        let width = self.bucket_width_secs;
        let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();

        for sample in samples {
            let Some(value) = sample.value else {
                continue;
            };
            let key = sample.timestamp.div_euclid(width) * width;
            let entry = buckets.entry(key).or_insert((0.0, 0));
            entry.0 += value.abs();
            entry.1 += 1;
        }

        let points = buckets
            .into_iter()
            .map(|(key, (sum, count))| {
                let mean = sum / count as f64;
                ChartPoint::new(
                    self.labels.label(key, LabelGranularity::Minutes),
                    self.display_value(mean),
                    key,
                )
            })
            .collect();

        Series::from_points(points)
    }

    /// One point per populated sample, no averaging. Samples sharing a
    /// timestamp are all kept, in input order.
    pub fn raw(&self, samples: &[Sample]) -> Vec<ChartPoint> {
        let mut points: Vec<ChartPoint> = samples
            .iter()
            .filter_map(|sample| {
                let value = sample.value?;
                Some(ChartPoint::new(
                    self.labels.label(sample.timestamp, LabelGranularity::Seconds),
                    self.display_value(value.abs()),
                    sample.timestamp,
                ))
            })
            .collect();

        points.sort_by_key(|point| point.timestamp);
        points
    }

    /// Bucketize `rows`, substituting `fallback` zeros when there is nothing
    /// to chart. `rows` is `None` when the upstream payload was malformed.
    pub fn process(&self, rows: Option<&[Sample]>, fallback: ZeroFill, now: i64) -> Processed {
        self.with_fallback(rows, fallback, now, |samples| {
            Some(self.bucketize(samples)).filter(|series| !series.is_empty())
        })
    }

    /// Like [`Bucketizer::process`] for the unbucketed view.
    pub fn process_raw(&self, rows: Option<&[Sample]>, now: i64) -> Processed<Vec<ChartPoint>> {
        self.with_fallback(rows, ZeroFill::RAW, now, |samples| {
            Some(self.raw(samples)).filter(|points| !points.is_empty())
        })
    }

    /// `build` returns `None` when the rows held nothing to chart.
    fn with_fallback<S, F>(
        &self,
        rows: Option<&[Sample]>,
        fallback: ZeroFill,
        now: i64,
        build: F,
    ) -> Processed<S>
    where
        S: From<Series>,
        F: FnOnce(&[Sample]) -> Option<S>,
    {
        let reason = match rows {
            None => FallbackReason::MalformedResponse,
            Some([]) => FallbackReason::NoValues,
            Some(samples) => match build(samples) {
                Some(series) => return Processed::Ok(series),
                None => FallbackReason::NoPopulatedPoints,
            },
        };

        Processed::Fallback {
            series: S::from(fallback.generate(now, &self.labels)),
            reason,
        }
    }

    fn display_value(&self, magnitude: f64) -> f64 {
        round2((magnitude * self.unit_scale_factor).max(0.0))
    }
}
