use super::{Fetch, FileJob, LoadSession, SourceLoader};
use crate::config;
use crate::parsing::iflog::IfLogNormalizer;
use crate::parsing::index::{sanitize_key, scrape_mrtg_index, IndexSelection};
use crate::parsing::{NormalizeRecords, NormalizedRecord, RecordMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;

/// Loader for classic MRTG trees: an `index.html` page linking one
/// `.html`/`.log` pair per port. A bare `*.log` URL loads as a single
/// metric without touching an index.
pub struct MrtgLoader {
    excluded: Vec<Regex>,
}

impl MrtgLoader {
    pub fn new(excluded: Vec<Regex>) -> Self {
        Self { excluded }
    }

    pub fn from_config() -> Result<Self> {
        Ok(Self::new(config::get()?.compile_excluded_interfaces()?))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|pattern| pattern.is_match(name))
    }
}

#[async_trait]
impl SourceLoader for MrtgLoader {
    async fn discover(
        &self,
        fetch: &dyn Fetch,
        selection: &IndexSelection,
        session: &mut LoadSession,
    ) -> Result<Vec<FileJob>> {
        if selection.url.ends_with(".log") {
            return Ok(vec![FileJob {
                path: selection.url.clone(),
                meta: RecordMeta {
                    key: sanitize_key(&selection.url, "1"),
                    name: selection.url.clone(),
                    host: selection.url.clone(),
                    ..Default::default()
                },
            }]);
        }

        let base_url = selection.directory().to_string();
        let data = fetch.fetch(&selection.url).await?;
        let html = String::from_utf8(data).context("MRTG index is not valid UTF-8")?;

        let mut jobs = Vec::new();
        for entry in scrape_mrtg_index(&html, &base_url) {
            if self.is_excluded(&entry.name) {
                continue;
            }
            let key = sanitize_key(&entry.switch_ip, &entry.port_id);
            if selection.preselect.contains(&entry.port_id) {
                session.preselect(&key);
            }
            jobs.push(FileJob {
                path: format!("{}.log", entry.file_prefix),
                meta: RecordMeta {
                    key,
                    name: entry.name,
                    host: entry.switch_ip,
                    node: 0,
                    info: None,
                    html: Some(format!("{}.html", entry.file_prefix)),
                },
            });
        }
        Ok(jobs)
    }

    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        IfLogNormalizer.normalize(data, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SessionHandle;
    use async_trait::async_trait;

    struct OneFile(&'static str, &'static str);

    #[async_trait]
    impl Fetch for OneFile {
        async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            anyhow::ensure!(path == self.0, "no such file: {}", path);
            Ok(self.1.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_bare_log_url_is_a_single_job() {
        let loader = MrtgLoader::new(vec![]);
        let handle = SessionHandle::new();
        let mut session = LoadSession::new(&handle);
        let selection = IndexSelection::parse("mrtg/sw_25.log");
        let jobs = loader
            .discover(&OneFile("unused", ""), &selection, &mut session)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path, "mrtg/sw_25.log");
    }

    #[tokio::test]
    async fn test_index_scrape_builds_log_and_html_paths() {
        let html = r#"<td><div><a href="sw_25.html"><b>10.0.0.1: uplink</b></a></div></td>"#;
        let loader = MrtgLoader::new(vec![]);
        let handle = SessionHandle::new();
        let mut session = LoadSession::new(&handle);
        let selection = IndexSelection::parse("mrtg/index.html");
        let jobs = loader
            .discover(&OneFile("mrtg/index.html", html), &selection, &mut session)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path, "mrtg/sw_25.log");
        assert_eq!(jobs[0].meta.html.as_deref(), Some("mrtg/sw_25.html"));
        assert_eq!(jobs[0].meta.name, "uplink");
    }
}
