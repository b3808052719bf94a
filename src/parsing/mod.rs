use crate::datamodel::{Channel, CounterKind, Sample, UnitSpec};
use anyhow::{bail, Result};

pub mod iflog;
pub mod index;
pub mod perfdata;
pub mod service_groups;
pub mod storwize;

/// What the loader already knows about a file before fetching it,
/// gathered from the index that referenced it.
#[derive(Debug, Default, Clone)]
pub struct RecordMeta {
    /// Stable metric key; empty when the normalizer derives keys from the
    /// payload itself (storage stats, perfdata).
    pub key: String,
    pub name: String,
    pub host: String,
    /// Source node index for multi-controller fan-in.
    pub node: usize,
    /// Raw index entry kept for the detail panel.
    pub info: Option<serde_json::Value>,
    /// Companion HTML page, when the index names one.
    pub html: Option<String>,
}

/// One channel of raw samples as extracted from a payload, before rate
/// conversion and merging.
#[derive(Debug, Clone)]
pub struct NormalizedChannel {
    pub channel: Channel,
    pub kind: CounterKind,
    pub samples: Vec<Sample>,
}

/// Everything one payload contributes to one metric. Counter channels go
/// through rate conversion per node then node merging, gauge channels go
/// into the metric map directly.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub key: String,
    pub name: String,
    pub host: String,
    pub node: usize,
    pub unit: UnitSpec,
    pub group: Option<&'static str>,
    pub channels: Vec<NormalizedChannel>,
    pub info: Option<serde_json::Value>,
    pub html: Option<String>,
}

impl NormalizedRecord {
    pub fn from_meta(meta: &RecordMeta, unit: UnitSpec) -> Self {
        Self {
            key: meta.key.clone(),
            name: meta.name.clone(),
            host: meta.host.clone(),
            node: meta.node,
            unit,
            group: None,
            channels: Vec::new(),
            info: meta.info.clone(),
            html: meta.html.clone(),
        }
    }
}

/// Adapter from one raw payload format to the common record shape. One
/// implementation per source format; the pipeline never sees the wire
/// formats themselves.
pub trait NormalizeRecords: Send + Sync {
    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>>;
}

pub fn get_normalizer_from_name(name: &str) -> Result<Box<dyn NormalizeRecords>> {
    match name {
        "iflog" => Ok(Box::new(iflog::IfLogNormalizer)),
        "storwize_mdisk" => Ok(Box::new(storwize::StorwizeNormalizer::mdisk())),
        "storwize_vdisk" => Ok(Box::new(storwize::StorwizeNormalizer::vdisk())),
        "perfdata" => Ok(Box::new(perfdata::PerfdataNormalizer)),
        _ => bail!("Unsupported normalizer: {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizer_registry() {
        assert!(get_normalizer_from_name("iflog").is_ok());
        assert!(get_normalizer_from_name("storwize_mdisk").is_ok());
        assert!(get_normalizer_from_name("perfdata").is_ok());
        assert!(get_normalizer_from_name("carrier_pigeon").is_err());
    }
}
