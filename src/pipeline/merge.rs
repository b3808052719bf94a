use crate::datamodel::Sample;
use std::collections::BTreeMap;

/// Combines several same-key series into one by summing values that share
/// a timestamp. Used to stack the per-node series of redundant storage
/// controllers into one logical series.
///
/// Summation by key is commutative, so the order of the input series does
/// not matter. Timestamps present in only some inputs keep their own sum.
/// The result is ordered ascending by timestamp; an empty input (or a
/// list of empty series) yields an empty result.
///
/// This is a sum, not an average. Callers wanting a mean across sources
/// must divide by the source count themselves.
pub fn merge(series_list: &[Vec<Sample>]) -> Vec<Sample> {
    let mut sums: BTreeMap<i64, f64> = BTreeMap::new();
    for series in series_list {
        for sample in series {
            *sums.entry(sample.timestamp).or_insert(0.0) += sample.value;
        }
    }
    sums.into_iter()
        .map(|(timestamp, value)| Sample::new(timestamp, value))
        .collect()
}
