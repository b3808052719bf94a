use serde::Serialize;

/// One reading of one channel: epoch milliseconds and a value.
///
/// A missing reading is encoded as `f64::NAN` so a series stays a flat
/// `Vec<Sample>`. Aggregations skip missing values, but a missing sample
/// still participates in the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn missing(timestamp: i64) -> Self {
        Self {
            timestamp,
            value: f64::NAN,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// Sorts a raw series ascending by timestamp, in place.
///
/// Raw counter collections arrive unordered (multi-file fan-in). Only the
/// relative order of differing timestamps matters downstream, so an
/// unstable sort is fine.
pub fn sort_by_time(samples: &mut [Sample]) {
    samples.sort_unstable_by_key(|sample| sample.timestamp);
}
