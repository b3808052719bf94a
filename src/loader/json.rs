use super::{Fetch, FileJob, LoadSession, SourceLoader};
use crate::config;
use crate::parsing::iflog::IfLogNormalizer;
use crate::parsing::index::{parse_json_index, sanitize_key, IndexSelection};
use crate::parsing::{NormalizeRecords, NormalizedRecord, RecordMeta};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

/// Loader for the JSON indexes written by the SNMP collector: one index
/// per switch naming the per-interface log files.
pub struct JsonLoader {
    excluded: Vec<Regex>,
}

impl JsonLoader {
    pub fn new(excluded: Vec<Regex>) -> Self {
        Self { excluded }
    }

    pub fn from_config() -> Result<Self> {
        Ok(Self::new(config::get()?.compile_excluded_interfaces()?))
    }

    fn is_excluded(&self, description: &str) -> bool {
        self.excluded
            .iter()
            .any(|pattern| pattern.is_match(description))
    }
}

#[async_trait]
impl SourceLoader for JsonLoader {
    async fn discover(
        &self,
        fetch: &dyn Fetch,
        selection: &IndexSelection,
        session: &mut LoadSession,
    ) -> Result<Vec<FileJob>> {
        let data = fetch.fetch(&selection.url).await?;
        let index = parse_json_index(&data)?;
        let directory = selection.directory();

        let mut jobs = Vec::new();
        for (port_id, interface) in &index.ifs {
            if self.is_excluded(&interface.if_descr) {
                continue;
            }
            let key = sanitize_key(&index.ip, port_id);
            if selection.preselect.contains(port_id) {
                session.preselect(&key);
            }
            let mut info = serde_json::Map::new();
            info.insert("ifDescr".into(), interface.if_descr.clone().into());
            if let Some(alias) = &interface.if_alias {
                info.insert("ifAlias".into(), alias.clone().into());
            }
            info.insert("log".into(), interface.log.clone().into());
            info.extend(interface.extra.clone());

            jobs.push(FileJob {
                path: format!("{directory}{}", interface.log),
                meta: RecordMeta {
                    key,
                    name: interface.display_name().to_string(),
                    host: index.ip.clone(),
                    node: 0,
                    info: Some(serde_json::Value::Object(info)),
                    html: None,
                },
            });
        }
        Ok(jobs)
    }

    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        IfLogNormalizer.normalize(data, meta)
    }
}
