use super::{Fetch, FileJob, LoadSession, SourceLoader};
use crate::parsing::index::IndexSelection;
use crate::parsing::perfdata::PerfdataNormalizer;
use crate::parsing::{NormalizeRecords, NormalizedRecord, RecordMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Loader for the perfdata tree the Nagios hook writes: a plain-text
/// index listing one `host/service/label` file path per line. Keys and
/// metadata come out of the file headers, not the index.
pub struct NagiosLoader;

#[async_trait]
impl SourceLoader for NagiosLoader {
    async fn discover(
        &self,
        fetch: &dyn Fetch,
        selection: &IndexSelection,
        _session: &mut LoadSession,
    ) -> Result<Vec<FileJob>> {
        let data = fetch.fetch(&selection.url).await?;
        let listing = String::from_utf8(data).context("perfdata index is not valid UTF-8")?;
        let directory = selection.directory();

        let jobs = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.ends_with("index.html"))
            .map(|line| {
                let relative = line.trim_start_matches("./");
                FileJob {
                    path: format!("{directory}{relative}"),
                    meta: RecordMeta::default(),
                }
            })
            .collect();
        Ok(jobs)
    }

    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>> {
        PerfdataNormalizer.normalize(data, meta)
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

    #[tokio::test]
    async fn test_discover_lists_perfdata_files() {
        let loader = NagiosLoader;
        let handle = SessionHandle::new();
        let mut session = LoadSession::new(&handle);
        let selection = IndexSelection::parse("perf/index.html");
        let jobs = loader
            .discover(
                &Listing("./www/PING/rta\n./www/PING/pl\n./www/index.html\n\n"),
                &selection,
                &mut session,
            )
            .await
            .unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].path, "perf/www/PING/rta");
        assert_eq!(jobs[1].path, "perf/www/PING/pl");
    }
}
