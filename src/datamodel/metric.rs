use super::{Channel, Sample, UnitSpec};
use std::collections::BTreeMap;

/// How a channel's raw samples must be interpreted before plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    /// Cumulative counter: difference adjacent samples and divide by the
    /// elapsed time, producing a per-second rate.
    Counter,
    /// Cumulative counter for an already-periodic quantity: difference
    /// adjacent samples but keep the raw delta.
    Delta,
    /// Absolute reading, usable as-is.
    Gauge,
}

/// One logical metric (an interface, a disk, a host service), identified
/// by a stable string key, owning its post-merge channel series and the
/// descriptive metadata the presentation layer needs.
#[derive(Debug, Clone)]
pub struct NamedMetric {
    pub key: String,
    /// Display name, e.g. the interface alias or `service label`.
    pub name: String,
    /// Owning host or switch IP.
    pub host: String,
    pub unit: UnitSpec,
    pub channels: BTreeMap<Channel, Vec<Sample>>,
    /// Classification from the service-group rules, when one applies.
    pub group: Option<&'static str>,
    /// Raw per-interface object from a JSON index, kept for the detail
    /// panel.
    pub info: Option<serde_json::Value>,
    /// Companion HTML page of an MRTG log, when one exists.
    pub html: Option<String>,
}

impl NamedMetric {
    pub fn new(key: impl Into<String>, name: impl Into<String>, host: impl Into<String>, unit: UnitSpec) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            host: host.into(),
            unit,
            channels: BTreeMap::new(),
            group: None,
            info: None,
            html: None,
        }
    }

    /// Series of one channel, empty when the channel has no data. Callers
    /// never need to distinguish "absent channel" from "empty channel".
    pub fn channel(&self, channel: Channel) -> &[Sample] {
        self.channels
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn insert_channel(&mut self, channel: Channel, samples: Vec<Sample>) {
        self.channels.insert(channel, samples);
    }
}

/// Name→metric map of one completed load cycle. A reload replaces the
/// whole map, nothing is mutated incrementally. BTreeMap keeps the legend
/// ordering deterministic.
pub type MetricMap = BTreeMap<String, NamedMetric>;
