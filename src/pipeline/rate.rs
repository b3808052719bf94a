use crate::datamodel::{sample::sort_by_time, Sample};

/// Turns a raw cumulative counter series into per-second rates (or raw
/// deltas when `time_related` is false).
///
/// The input may be empty or unsorted. Adjacent pairs with a zero or
/// negative elapsed time are skipped outright, so the result never divides
/// by a non-positive interval. A counter decrease (reset or wraparound) is
/// clamped to a zero delta: a rate is never negative, and the wrapped
/// magnitude is deliberately discarded rather than guessed at.
///
/// Each output sample carries the timestamp of the newer sample of its
/// pair, so the result has at most one element less than the input.
pub fn convert(mut samples: Vec<Sample>, time_related: bool) -> Vec<Sample> {
    sort_by_time(&mut samples);
    let mut rates = Vec::with_capacity(samples.len().saturating_sub(1));
    for pair in samples.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let elapsed_ms = curr.timestamp - prev.timestamp;
        if elapsed_ms <= 0 {
            continue;
        }
        let delta = (curr.value - prev.value).max(0.0);
        let value = if time_related {
            delta / (elapsed_ms as f64 / 1000.0)
        } else {
            delta
        };
        rates.push(Sample::new(curr.timestamp, value));
    }
    rates
}
