//! The pure transformation stages: raw counters in, chart-ready series
//! out. Every function here is total over its documented input domain;
//! errors live at the I/O and parsing boundary, not in this module.

pub mod aggregate;
pub mod merge;
pub mod rate;
pub mod window;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::Sample;

    #[test]
    fn test_two_node_counters_merge_into_one_rate_series() {
        // Two redundant nodes report the same metric. Each is converted
        // to a rate on its own, then the nodes are stacked by timestamp.
        let node1 = vec![Sample::new(0, 0.0), Sample::new(1000, 100.0)];
        let node2 = vec![Sample::new(0, 0.0), Sample::new(1000, 50.0)];
        let merged = merge::merge(&[
            rate::convert(node1, true),
            rate::convert(node2, true),
        ]);
        assert_eq!(merged, vec![Sample::new(1000, 150.0)]);
    }
}
