use super::{NormalizeRecords, NormalizedChannel, NormalizedRecord, RecordMeta};
use crate::datamodel::{Channel, CounterKind, NetworkChannel, Sample, UnitSpec};
use anyhow::{Context, Result};

/// Interface counter logs as written by the SNMP collectors: one header
/// line with the current raw counters, then whitespace-separated rows of
/// `epoch_seconds in_bytes out_bytes in_packets out_packets`.
///
/// The rows already contain per-second rates (the collector differences
/// its counters on write), so every channel is a gauge here and skips
/// rate conversion. The inbound channels additionally get negated twins
/// (`j`/`J`) for below-axis plotting.
pub struct IfLogNormalizer;

impl NormalizeRecords for IfLogNormalizer {
    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        let text = std::str::from_utf8(data).context("interface log is not valid UTF-8")?;
        let mut rows: Vec<(i64, [f64; 4])> = Vec::new();
        // First line is the raw counter header, not a data row.
        for line in text.lines().skip(1) {
            let mut columns = line.split_whitespace();
            let timestamp = match columns.next().and_then(|c| c.parse::<i64>().ok()) {
                Some(seconds) => seconds * 1000,
                None => continue,
            };
            let mut values = [0.0f64; 4];
            let mut complete = true;
            for slot in values.iter_mut() {
                match columns.next().and_then(|c| c.parse::<f64>().ok()) {
                    Some(value) => *slot = value,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                rows.push((timestamp, values));
            }
        }
        rows.sort_unstable_by_key(|(timestamp, _)| *timestamp);

        let mut record = NormalizedRecord::from_meta(meta, UnitSpec::PerChannel);
        for channel in NetworkChannel::ALL {
            let column = match channel {
                NetworkChannel::In | NetworkChannel::InNeg => 0,
                NetworkChannel::Out => 1,
                NetworkChannel::InPackets | NetworkChannel::InPacketsNeg => 2,
                NetworkChannel::OutPackets => 3,
            };
            let sign = if channel.is_negated() { -1.0 } else { 1.0 };
            let samples = rows
                .iter()
                .map(|(timestamp, values)| Sample::new(*timestamp, sign * values[column]))
                .collect();
            record.channels.push(NormalizedChannel {
                channel: Channel::Network(channel),
                kind: CounterKind::Gauge,
                samples,
            });
        }
        Ok(vec![record])
    }
}
