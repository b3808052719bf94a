use super::{Fetch, FileJob, LoadSession, SourceLoader};
use crate::parsing::index::{parse_compact_datetime, scrape_hrefs, storwize_node_index, IndexSelection};
use crate::parsing::storwize::StorwizeNormalizer;
use crate::parsing::{NormalizeRecords, NormalizedRecord, RecordMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Which Storwize entity the stats files describe. The first letter of
/// the tag doubles as the stats-file prefix (`Nm_stats_*`, `Nv_stats_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSource {
    MDisk,
    VDisk,
}

impl StorageSource {
    fn file_prefix(&self) -> &'static str {
        match self {
            StorageSource::MDisk => "Nm_stats_",
            StorageSource::VDisk => "Nv_stats_",
        }
    }

    fn normalizer(&self) -> StorwizeNormalizer {
        match self {
            StorageSource::MDisk => StorwizeNormalizer::mdisk(),
            StorageSource::VDisk => StorwizeNormalizer::vdisk(),
        }
    }
}

/// Loader for a Storwize stats directory: a listing page of per-node
/// dump files with the capture time encoded in the filename. Only files
/// younger than the requested interval are fetched; the node index in
/// the filename drives the cross-controller merge.
pub struct StorageLoader {
    source: StorageSource,
    interval_hours: u32,
    now_ms: i64,
}

impl StorageLoader {
    pub fn new(source: StorageSource, interval_hours: u32) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0);
        Self::with_now(source, interval_hours, now_ms)
    }

    /// Injectable clock for tests.
    pub fn with_now(source: StorageSource, interval_hours: u32, now_ms: i64) -> Self {
        Self {
            source,
            interval_hours,
            now_ms,
        }
    }
}

#[async_trait]
impl SourceLoader for StorageLoader {
    async fn discover(
        &self,
        fetch: &dyn Fetch,
        selection: &IndexSelection,
        session: &mut LoadSession,
    ) -> Result<Vec<FileJob>> {
        let data = fetch.fetch(&selection.url).await?;
        let html = String::from_utf8(data).context("directory listing is not valid UTF-8")?;
        let base = selection.directory().to_string();
        for key in &selection.preselect {
            session.preselect(key);
        }

        let max_age_ms = self.interval_hours as i64 * 3_600_000;
        let mut jobs = Vec::new();
        for href in scrape_hrefs(&html) {
            if !href.starts_with(self.source.file_prefix()) {
                continue;
            }
            let segments: Vec<&str> = href.split('_').collect();
            let captured = match (segments.get(3), segments.get(4)) {
                (Some(date), Some(time)) => parse_compact_datetime(date, time),
                _ => None,
            };
            let Some(captured) = captured else {
                warn!("skipping stats file with unparseable name: {}", href);
                continue;
            };
            if self.now_ms - captured >= max_age_ms {
                continue;
            }
            let Some(node) = storwize_node_index(&href) else {
                warn!("skipping stats file without a node index: {}", href);
                continue;
            };
            jobs.push(FileJob {
                path: format!("{base}{href}"),
                meta: RecordMeta {
                    host: selection.url.clone(),
                    node,
                    ..Default::default()
                },
            });
        }
        Ok(jobs)
    }

    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        self.source.normalizer().normalize(data, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SessionHandle;
    use async_trait::async_trait;

    struct Listing(&'static str);

    #[async_trait]
    impl Fetch for Listing {
        async fn fetch(&self, _path: &str) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const LISTING: &str = r#"
<a href="Nm_stats_78G00PG-1_151112_112038">f</a>
<a href="Nm_stats_78G00PG-2_151112_112038">f</a>
<a href="Nm_stats_78G00PG-1_151101_000000">old</a>
<a href="Nv_stats_78G00PG-1_151112_112038">vdisk</a>
<a href="subdir/">dir</a>
"#;

    // 2015-11-12 12:00:00 UTC
    const NOW_MS: i64 = 1_447_329_600_000;

    #[tokio::test]
    async fn test_discover_filters_by_prefix_and_age() {
        let loader = StorageLoader::with_now(StorageSource::MDisk, 24, NOW_MS);
        let handle = SessionHandle::new();
        let mut session = LoadSession::new(&handle);
        let selection = IndexSelection::parse("stats/");
        let jobs = loader
            .discover(&Listing(LISTING), &selection, &mut session)
            .await
            .unwrap();
        // The two recent mdisk files; the 11-day-old one and the vdisk
        // file stay behind.
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].path, "stats/Nm_stats_78G00PG-1_151112_112038");
        assert_eq!(jobs[0].meta.node, 0);
        assert_eq!(jobs[1].meta.node, 1);
    }
}
