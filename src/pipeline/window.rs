use crate::datamodel::Sample;
use std::collections::BTreeMap;

/// Number of buckets a dense window is reduced to. Independent from the
/// trigger threshold (`max_points`): the trigger decides *whether* to
/// downsample, this constant decides *how hard*.
pub const DOWNSAMPLE_BUCKETS: usize = 400;

#[derive(Default)]
struct Bucket {
    count: usize,
    sum: f64,
    max: f64,
}

/// Clips an ordered series to the half-open window `[from, to)`, scaling
/// every retained value by `unit_multiplier` (e.g. ×8 for bytes/s shown
/// as bits/s).
///
/// When more than `max_points` samples survive the clip, the window is
/// reduced to [`DOWNSAMPLE_BUCKETS`] fixed-width buckets over the span of
/// the retained points. Each non-empty bucket yields one output sample:
/// the bucket maximum when `use_max` is set (negated and packet channels,
/// where the largest deflection must survive), otherwise the arithmetic
/// mean. The output timestamp is `bucket_index * bucket_width`, an
/// approximation of the bucket start kept for compatibility with existing
/// charts.
pub fn filter_window(
    series: &[Sample],
    from: i64,
    to: i64,
    unit_multiplier: f64,
    use_max: bool,
    max_points: usize,
) -> Vec<Sample> {
    let kept: Vec<Sample> = series
        .iter()
        .filter(|sample| sample.timestamp >= from && sample.timestamp < to)
        .map(|sample| Sample::new(sample.timestamp, sample.value * unit_multiplier))
        .collect();
    if kept.len() <= max_points {
        return kept;
    }

    let min_t = kept.first().map(|s| s.timestamp).unwrap_or(0);
    let max_t = kept.last().map(|s| s.timestamp).unwrap_or(0);
    let bucket_width = (max_t - min_t).abs() as f64 / DOWNSAMPLE_BUCKETS as f64;
    if bucket_width <= 0.0 {
        // Everything shares one timestamp, nothing to spread over buckets.
        return kept;
    }

    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
    for sample in &kept {
        let index = (sample.timestamp as f64 / bucket_width).floor() as i64;
        let bucket = buckets.entry(index).or_default();
        if bucket.count == 0 {
            bucket.max = sample.value;
        } else {
            bucket.max = bucket.max.max(sample.value);
        }
        bucket.count += 1;
        bucket.sum += sample.value;
    }

    buckets
        .into_iter()
        .map(|(index, bucket)| {
            let value = if use_max {
                bucket.max
            } else {
                bucket.sum / bucket.count as f64
            };
            Sample::new((index as f64 * bucket_width) as i64, value)
        })
        .collect()
}
