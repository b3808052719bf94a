use crate::datamodel::Sample;

/// Time-weighted sum of a rate series over `[from, to)`, approximating
/// the integral of the rate: the total volume (e.g. bytes transferred)
/// in the window.
///
/// Walks the series newest to oldest, treating each sample as
/// representative of the interval back to the previous (older) in-range
/// sample: `|value| * interval_seconds` per step. The newest in-range
/// sample anchors the walk and contributes nothing by itself. Missing
/// values are skipped without resetting the anchor, so their interval is
/// attributed to the next older reading. Returns 0 when nothing is in
/// range.
pub fn time_weighted_sum(series: &[Sample], from: i64, to: i64) -> f64 {
    let mut total = 0.0;
    let mut last_seen: Option<i64> = None;
    for sample in series.iter().rev() {
        if sample.timestamp < from || sample.timestamp >= to {
            continue;
        }
        if sample.is_missing() {
            continue;
        }
        let last = last_seen.unwrap_or(sample.timestamp);
        total += sample.value.abs() * (last - sample.timestamp) as f64 / 1000.0;
        last_seen = Some(sample.timestamp);
    }
    total
}

/// Mean of the in-range, non-missing values. Returns `None` when no
/// qualifying sample exists: "no data" and "average of zero" must stay
/// distinguishable.
pub fn average(series: &[Sample], from: i64, to: i64) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for sample in series {
        if sample.timestamp < from || sample.timestamp >= to || sample.is_missing() {
            continue;
        }
        sum += sample.value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
