use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A source URL as given on the query string or command line: the index
/// path itself, optionally followed by `;port` segments preselecting a
/// subset of its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSelection {
    pub url: String,
    pub preselect: Vec<String>,
}

impl IndexSelection {
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split(';').map(str::to_string);
        let url = segments.next().unwrap_or_default();
        Self {
            url,
            preselect: segments.collect(),
        }
    }

    /// Directory part of the index URL, for resolving relative log paths.
    pub fn directory(&self) -> &str {
        match self.url.rfind('/') {
            Some(position) => &self.url[..=position],
            None => "",
        }
    }
}

/// One interface entry of a JSON index. The full raw object is kept
/// alongside the typed fields for the detail panel.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceInfo {
    #[serde(rename = "ifDescr", default)]
    pub if_descr: String,
    #[serde(rename = "ifAlias", default)]
    pub if_alias: Option<String>,
    pub log: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InterfaceInfo {
    pub fn display_name(&self) -> &str {
        match &self.if_alias {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.if_descr,
        }
    }
}

/// A JSON index as written by the SNMP collector: the switch IP and one
/// entry per monitored interface.
#[derive(Debug, Deserialize)]
pub struct JsonIndex {
    pub ip: String,
    pub ifs: BTreeMap<String, InterfaceInfo>,
}

pub fn parse_json_index(data: &[u8]) -> Result<JsonIndex> {
    serde_json::from_slice(data).context("unparseable JSON index")
}

static NON_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());

/// Stable metric key from a host identifier and port id. Everything that
/// is not alphanumeric collapses to `_` so keys survive being used in
/// element ids and query strings.
pub fn sanitize_key(host: &str, port_id: &str) -> String {
    format!(
        "{}{}",
        NON_KEY_RE.replace_all(host, "_"),
        port_id.replace('.', "_")
    )
}

/// One scraped entry of an MRTG `index.html`.
#[derive(Debug, Clone, PartialEq)]
pub struct MrtgEntry {
    /// Path prefix of the per-port files; append `.log` / `.html`.
    pub file_prefix: String,
    pub port_id: String,
    pub name: String,
    pub switch_ip: String,
}

static MRTG_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a\s+href="([^"]+?)\.[a-z]+"[^>]*>.*?<b>([^<]*)</b>"#).unwrap());

/// Scrapes the per-port links out of an MRTG index page. Entry names of
/// the form `ip: description` split into the owning switch and the
/// display name; the port id is the filename part after the first `_`.
pub fn scrape_mrtg_index(html: &str, base_url: &str) -> Vec<MrtgEntry> {
    let mut entries = Vec::new();
    for caps in MRTG_LINK_RE.captures_iter(html) {
        let href_base = &caps[1];
        let mut name = caps[2].trim().to_string();
        let mut switch_ip = base_url.to_string();
        if let Some(position) = name.find(": ") {
            switch_ip = name[..position].to_string();
            name = name[position + 2..].to_string();
        }
        let file_prefix = format!("{base_url}{href_base}");
        let basename = match file_prefix.rfind('/') {
            Some(position) => &file_prefix[position + 1..],
            None => &file_prefix,
        };
        let port_id = match basename.find('_') {
            Some(position) => basename[position + 1..].to_string(),
            None => basename.to_string(),
        };
        entries.push(MrtgEntry {
            file_prefix,
            port_id,
            name,
            switch_ip,
        });
    }
    entries
}

static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<a\s+href="([^"]+)""#).unwrap());

/// All link targets of a directory listing page, directories excluded.
pub fn scrape_hrefs(html: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .filter(|href| !href.ends_with('/'))
        .collect()
}

/// Node index from a Storwize stats filename such as
/// `Nm_stats_78G00PG-1_151112_112038`: the `-1` of the third segment,
/// zero-based.
pub fn storwize_node_index(filename: &str) -> Option<usize> {
    let segment = filename.split('_').nth(2)?;
    let node: usize = segment.split('-').nth(1)?.parse().ok()?;
    node.checked_sub(1)
}

/// Timestamp fields of a Storwize stats filename (`YYMMDD`, `HHMMSS`) as
/// epoch milliseconds. Years are 20xx.
pub fn parse_compact_datetime(date: &str, time: &str) -> Option<i64> {
    if date.len() != 6 || time.len() != 6 {
        return None;
    }
    let field = |s: &str, range: std::ops::Range<usize>| s[range].parse::<u8>().ok();
    let year = 2000 + date[0..2].parse::<i32>().ok()?;
    // Digit counts alone don't make a valid date; a calendar-invalid
    // month or day comes back as None.
    let epoch = hifitime::Epoch::maybe_from_gregorian_utc(
        year,
        field(date, 2..4)?,
        field(date, 4..6)?,
        field(time, 0..2)?,
        field(time, 2..4)?,
        field(time, 4..6)?,
        0,
    )
    .ok()?;
    Some(epoch.to_unix_milliseconds().round() as i64)
}
