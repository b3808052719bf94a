use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Asynchronous byte source for indexes and log files. The pipeline does
/// no I/O of its own; everything it consumes arrives through this trait.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Fetcher over a local directory tree, the layout the collectors write.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetch for FileFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        tokio::fs::read(&full)
            .await
            .with_context(|| format!("failed to read {}", full.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("index.json")).unwrap();
        writeln!(file, "{{}}").unwrap();

        let fetcher = FileFetcher::new(dir.path());
        let data = fetcher.fetch("index.json").await.unwrap();
        assert_eq!(data, b"{}\n");

        assert!(fetcher.fetch("missing.log").await.is_err());
    }
}
