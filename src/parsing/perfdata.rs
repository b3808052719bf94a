use super::{service_groups, NormalizeRecords, NormalizedChannel, NormalizedRecord, RecordMeta};
use crate::datamodel::{Channel, CounterKind, NetworkChannel, Sample, UnitSpec};
use anyhow::{bail, Context, Result};

/// Nagios perfdata logs, one file per host/service/label: a tab-delimited
/// header line `host service label typeflag [warn crit min max]`, then
/// space-delimited `epoch_seconds value` rows.
///
/// The type flag is the unit captured from the perfdata value; `"c"`
/// marks a cumulative counter that needs rate conversion, anything else
/// is a gauge carried through with the flag as its unit. The
/// service-group rules supply the category and a unit hint for counters,
/// whose own "unit" is just the flag.
pub struct PerfdataNormalizer;

impl NormalizeRecords for PerfdataNormalizer {
    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        let text = std::str::from_utf8(data).context("perfdata log is not valid UTF-8")?;
        let mut lines = text.lines();
        let header = lines.next().unwrap_or_default();
        let fields: Vec<&str> = header.split('\t').collect();
        if fields.len() < 4 {
            bail!(
                "malformed perfdata header ({} of at least 4 fields): {:?}",
                fields.len(),
                header
            );
        }
        let (host, service, label, type_flag) = (fields[0], fields[1], fields[2], fields[3]);
        let is_counter = type_flag == "c";

        let mut samples = Vec::new();
        for line in lines {
            let mut columns = line.split_whitespace();
            let (Some(timestamp), Some(value)) = (columns.next(), columns.next()) else {
                continue;
            };
            let (Ok(timestamp), Ok(value)) = (timestamp.parse::<i64>(), value.parse::<f64>())
            else {
                continue;
            };
            samples.push(Sample::new(timestamp * 1000, value));
        }

        let classified = format!("{}_{}", service, label);
        let (group, unit_hint) = service_groups::primary(&classified);
        let unit = if is_counter {
            UnitSpec::fixed(unit_hint.unwrap_or("B/s"))
        } else {
            UnitSpec::fixed(if type_flag.is_empty() {
                unit_hint.unwrap_or("")
            } else {
                type_flag
            })
        };

        let mut record = NormalizedRecord::from_meta(meta, unit);
        record.key = format!("{}/{}/{}", host, service, label);
        record.name = format!("{} {}", service, label);
        record.host = host.to_string();
        record.group = group;
        record.channels.push(NormalizedChannel {
            // Perfdata metrics are single-channel; reuse the inbound slot.
            channel: Channel::Network(NetworkChannel::In),
            kind: if is_counter {
                CounterKind::Counter
            } else {
                CounterKind::Gauge
            },
            samples,
        });
        Ok(vec![record])
    }
}
