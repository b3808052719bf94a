use super::{NormalizeRecords, NormalizedChannel, NormalizedRecord, RecordMeta};
use crate::datamodel::{Channel, CounterKind, Sample, StorageChannel, UnitSpec};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static COLL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<diskStatsColl\b([^>]*)>(.*?)</diskStatsColl>").unwrap()
});
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)="([^"]*)""#).unwrap());
static WALL_CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})").unwrap());

/// Parses a Storwize wall clock (`"YYYY-MM-DD HH:MM:SS"`, space between
/// date and time) into epoch milliseconds. The space becomes a `T` first,
/// same substitution the browser performed before `Date.parse`.
pub fn parse_wall_clock(text: &str) -> Result<i64> {
    let text = text.replace(' ', "T");
    let caps = WALL_CLOCK_RE
        .captures(&text)
        .ok_or_else(|| anyhow!("unparseable timestamp: {}", text))?;
    let number = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    // The regex only checks digit counts; month/day ranges are validated
    // here, so "2015-13-40" errors instead of panicking mid-reload.
    let epoch = hifitime::Epoch::maybe_from_gregorian_utc(
        caps[1].parse::<i32>().unwrap_or(0),
        number(2) as u8,
        number(3) as u8,
        number(4) as u8,
        number(5) as u8,
        number(6) as u8,
        0,
    )
    .with_context(|| format!("invalid timestamp: {}", text))?;
    Ok(epoch.to_unix_milliseconds().round() as i64)
}

fn attributes(fragment: &str) -> BTreeMap<&str, &str> {
    ATTR_RE
        .captures_iter(fragment)
        .map(|caps| {
            (
                caps.get(1).unwrap().as_str(),
                caps.get(2).unwrap().as_str(),
            )
        })
        .collect()
}

/// Storwize per-node statistics dumps: `<diskStatsColl>` elements carrying
/// a wall-clock timestamp and a block size, wrapping one element per disk
/// with cumulative counter attributes for all eight storage channels.
///
/// Everything here is a raw counter; rate conversion and the cross-node
/// merge happen downstream, keyed by the node index the loader read from
/// the stats filename.
pub struct StorwizeNormalizer {
    tag: &'static str,
    disk_re: Regex,
}

impl StorwizeNormalizer {
    pub fn mdisk() -> Self {
        Self::for_tag("mdsk")
    }

    pub fn vdisk() -> Self {
        Self::for_tag("vdsk")
    }

    fn for_tag(tag: &'static str) -> Self {
        let disk_re = Regex::new(&format!(r"<{tag}\b([^>]*?)/?>")).unwrap();
        Self { tag, disk_re }
    }
}

impl NormalizeRecords for StorwizeNormalizer {
    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        let text = std::str::from_utf8(data).context("storage stats are not valid UTF-8")?;
        let mut disks: BTreeMap<String, BTreeMap<StorageChannel, Vec<Sample>>> = BTreeMap::new();

        for coll in COLL_RE.captures_iter(text) {
            let coll_attrs = attributes(coll.get(1).unwrap().as_str());
            let timestamp = match coll_attrs.get("timestamp") {
                Some(raw) => parse_wall_clock(raw)?,
                None => continue,
            };
            let size_unit: f64 = coll_attrs
                .get("sizeUnits")
                .and_then(|raw| raw.trim_end_matches('B').parse().ok())
                .unwrap_or(512.0);

            for disk in self.disk_re.captures_iter(coll.get(2).unwrap().as_str()) {
                let disk_attrs = attributes(disk.get(1).unwrap().as_str());
                let name = disk_attrs
                    .get("id")
                    .filter(|id| !id.is_empty())
                    .or_else(|| disk_attrs.get("idx"))
                    .map(|name| name.to_string());
                let Some(name) = name else { continue };
                let channels = disks.entry(name).or_default();
                for channel in StorageChannel::ALL {
                    let Some(raw) = disk_attrs.get(channel.xml_attribute()) else {
                        continue;
                    };
                    let Ok(mut value) = raw.parse::<f64>() else {
                        continue;
                    };
                    if channel.scales_with_size_unit() {
                        value *= size_unit;
                    }
                    channels
                        .entry(channel)
                        .or_default()
                        .push(Sample::new(timestamp, value));
                }
            }
        }

        let records = disks
            .into_iter()
            .map(|(name, channels)| {
                let mut record = NormalizedRecord::from_meta(meta, UnitSpec::PerChannel);
                record.key = name.clone();
                record.name = name;
                record.channels = channels
                    .into_iter()
                    .map(|(channel, samples)| NormalizedChannel {
                        channel: Channel::Storage(channel),
                        kind: CounterKind::Counter,
                        samples,
                    })
                    .collect();
                record
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"<?xml version="1.0"?>
<stats>
<diskStatsColl timestamp="2015-11-12 11:20:38" sizeUnits="512B" countsPerSec="1">
  <mdsk idx="0" id="array0" rb="1000" wb="2000" ro="10" wo="20" rl="5" wl="7" ctr="3" ctw="4"/>
  <mdsk idx="1" id="array1" rb="500" wb="600" ro="1" wo="2" rl="3" wl="4" ctr="5" ctw="6"/>
</diskStatsColl>
<diskStatsColl timestamp="2015-11-12 11:25:38" sizeUnits="512B" countsPerSec="1">
  <mdsk idx="0" id="array0" rb="1100" wb="2200" ro="11" wo="22" rl="6" wl="8" ctr="4" ctw="5"/>
</diskStatsColl>
</stats>
"#;

    fn normalize() -> Vec<NormalizedRecord> {
        let meta = RecordMeta {
            host: "storwize1".into(),
            node: 1,
            ..Default::default()
        };
        StorwizeNormalizer::mdisk()
            .normalize(STATS.as_bytes(), &meta)
            .unwrap()
    }

    #[test]
    fn test_wall_clock_parsing() {
        // 2015-11-12T11:20:38 UTC
        assert_eq!(parse_wall_clock("2015-11-12 11:20:38").unwrap(), 1_447_327_238_000);
        assert!(parse_wall_clock("yesterday-ish").is_err());
    }

    #[test]
    fn test_calendar_invalid_wall_clock_is_an_error() {
        // Right shape, impossible date: month 13, day 40.
        assert!(parse_wall_clock("2015-13-40 11:20:38").is_err());
    }

    #[test]
    fn test_malformed_payload_fails_the_file_not_the_process() {
        let stats = r#"<stats>
<diskStatsColl timestamp="2015-13-40 11:20:38" sizeUnits="512B">
  <mdsk idx="0" id="array0" rb="1000"/>
</diskStatsColl>
</stats>"#;
        let result =
            StorwizeNormalizer::mdisk().normalize(stats.as_bytes(), &RecordMeta::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_one_record_per_disk() {
        let records = normalize();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "array0");
        assert_eq!(records[1].key, "array1");
        assert_eq!(records[0].node, 1);
    }

    #[test]
    fn test_byte_channels_scale_with_size_unit() {
        let records = normalize();
        let read_bytes = records[0]
            .channels
            .iter()
            .find(|c| c.channel == Channel::Storage(StorageChannel::ReadBytes))
            .unwrap();
        assert_eq!(read_bytes.samples[0].value, 1000.0 * 512.0);
        assert_eq!(read_bytes.samples.len(), 2);
    }

    #[test]
    fn test_transactions_come_from_ct_attributes() {
        let records = normalize();
        let read_tr = records[0]
            .channels
            .iter()
            .find(|c| c.channel == Channel::Storage(StorageChannel::ReadTransactions))
            .unwrap();
        assert_eq!(read_tr.samples[0].value, 3.0);
        assert!(records[0]
            .channels
            .iter()
            .all(|c| c.kind == CounterKind::Counter));
    }
}
