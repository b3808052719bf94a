use crate::datamodel::{Channel, CounterKind, MetricMap, NamedMetric, Sample, UnitSpec};
use crate::parsing::index::IndexSelection;
use crate::parsing::{NormalizedRecord, RecordMeta};
use crate::pipeline::{merge, rate};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub mod fetch;
pub mod json;
pub mod mrtg;
pub mod nagios;
pub mod storage;

pub use fetch::{Fetch, FileFetcher};

/// Shared generation counter across reload cycles. Starting a new session
/// bumps the generation; a session whose generation is no longer current
/// has been superseded and must drop its results instead of committing
/// them, so stale and fresh data can never merge.
#[derive(Debug, Default, Clone)]
pub struct SessionHandle {
    generation: Arc<AtomicU64>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// One file the loader still has to fetch and normalize.
#[derive(Debug, Clone)]
pub struct FileJob {
    pub path: String,
    pub meta: RecordMeta,
}

/// Everything one completed reload produced.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub metrics: MetricMap,
    /// Metric keys the index selection pre-checked for display.
    pub preselected: Vec<String>,
}

#[derive(Debug)]
struct CounterEntry {
    name: String,
    host: String,
    unit: UnitSpec,
    group: Option<&'static str>,
    info: Option<serde_json::Value>,
    html: Option<String>,
    /// channel → node → raw counter samples.
    channels: BTreeMap<Channel, (CounterKind, BTreeMap<usize, Vec<Sample>>)>,
}

/// Accumulator of one reload cycle. Created fresh per reload, never
/// shared across cycles: raw counters collect per node while files come
/// in, and the rate/merge step runs exactly once when the outstanding
/// counter reaches zero.
pub struct LoadSession {
    handle: SessionHandle,
    generation: u64,
    outstanding: usize,
    counters: BTreeMap<String, CounterEntry>,
    metrics: MetricMap,
    preselected: Vec<String>,
}

impl LoadSession {
    pub fn new(handle: &SessionHandle) -> Self {
        Self {
            handle: handle.clone(),
            generation: handle.begin(),
            outstanding: 0,
            counters: BTreeMap::new(),
            metrics: MetricMap::new(),
            preselected: Vec::new(),
        }
    }

    /// False once a newer session has been started on the same handle.
    pub fn is_current(&self) -> bool {
        self.handle.current() == self.generation
    }

    pub fn add_outstanding(&mut self, files: usize) {
        self.outstanding += files;
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn preselect(&mut self, key: impl Into<String>) {
        self.preselected.push(key.into());
    }

    /// Marks one file as done (loaded, failed, or skipped). Returns true
    /// when the fan-in gate has been reached and the session can finalize.
    pub fn file_loaded(&mut self) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.outstanding == 0
    }

    /// Marks all remaining files as skipped (user gave up waiting).
    pub fn skip_remaining(&mut self) {
        self.outstanding = 0;
    }

    /// Routes one normalized record into the accumulator. Gauge channels
    /// land in the metric map directly; counter channels collect per node
    /// for the rate/merge step at finalization.
    pub fn commit_record(&mut self, record: NormalizedRecord) {
        let NormalizedRecord {
            key,
            name,
            host,
            node,
            unit,
            group,
            channels,
            info,
            html,
        } = record;
        for normalized in channels {
            match normalized.kind {
                CounterKind::Gauge => {
                    let metric = self.metrics.entry(key.clone()).or_insert_with(|| {
                        let mut metric = NamedMetric::new(&key, &name, &host, unit.clone());
                        metric.group = group;
                        metric.info = info.clone();
                        metric.html = html.clone();
                        metric
                    });
                    metric
                        .channels
                        .entry(normalized.channel)
                        .or_default()
                        .extend(normalized.samples);
                }
                kind => {
                    let entry = self.counters.entry(key.clone()).or_insert_with(|| {
                        CounterEntry {
                            name: name.clone(),
                            host: host.clone(),
                            unit: unit.clone(),
                            group,
                            info: info.clone(),
                            html: html.clone(),
                            channels: BTreeMap::new(),
                        }
                    });
                    let (_, nodes) = entry
                        .channels
                        .entry(normalized.channel)
                        .or_insert_with(|| (kind, BTreeMap::new()));
                    nodes
                        .entry(node)
                        .or_default()
                        .extend(normalized.samples);
                }
            }
        }
    }

    /// Runs the rate/merge step over everything accumulated and produces
    /// the metric map. Returns `None` when the session was superseded by
    /// a newer reload; its partial data is discarded.
    pub fn finalize(mut self) -> Option<LoadOutcome> {
        if !self.is_current() {
            debug!(
                generation = self.generation,
                "discarding superseded load session"
            );
            return None;
        }
        for (key, entry) in std::mem::take(&mut self.counters) {
            let metric = self.metrics.entry(key.clone()).or_insert_with(|| {
                let mut metric = NamedMetric::new(&key, &entry.name, &entry.host, entry.unit.clone());
                metric.group = entry.group;
                metric.info = entry.info.clone();
                metric.html = entry.html.clone();
                metric
            });
            for (channel, (kind, nodes)) in entry.channels {
                let time_related = kind == CounterKind::Counter;
                let per_node: Vec<Vec<Sample>> = nodes
                    .into_values()
                    .map(|samples| rate::convert(samples, time_related))
                    .collect();
                metric.insert_channel(channel, merge::merge(&per_node));
            }
        }
        // Gauge channels may have collected from several files; order them.
        for metric in self.metrics.values_mut() {
            for samples in metric.channels.values_mut() {
                crate::datamodel::sample::sort_by_time(samples);
            }
        }
        Some(LoadOutcome {
            metrics: self.metrics,
            preselected: self.preselected,
        })
    }
}

/// One source format's driver: finds the files behind an index URL and
/// normalizes each fetched payload. The shared fan-in accounting lives in
/// [`LoadSession`] and [`run_reload`], not in the implementations.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn discover(
        &self,
        fetch: &dyn Fetch,
        selection: &IndexSelection,
        session: &mut LoadSession,
    ) -> Result<Vec<FileJob>>;

    fn normalize(&self, data: &[u8], meta: &RecordMeta) -> Result<Vec<NormalizedRecord>>;
}

/// Runs one full reload cycle: discover files behind every index, fetch
/// them concurrently, commit each normalized payload, and finalize once
/// the fan-in gate is reached.
///
/// A failing index or file is reported and counted as done; its
/// contribution is simply absent from the merge. Returns `Ok(None)` when
/// the session was superseded mid-flight.
pub async fn run_reload(
    loader: &dyn SourceLoader,
    fetch: &dyn Fetch,
    sources: &[String],
    handle: &SessionHandle,
) -> Result<Option<LoadOutcome>> {
    let mut session = LoadSession::new(handle);
    let mut jobs: Vec<FileJob> = Vec::new();
    for source in sources {
        let selection = IndexSelection::parse(source);
        match loader.discover(fetch, &selection, &mut session).await {
            Ok(found) => jobs.extend(found),
            Err(error) => warn!("failed to load index {}: {:#}", selection.url, error),
        }
    }
    session.add_outstanding(jobs.len());
    if jobs.is_empty() {
        debug!("no data to load");
    }

    let payloads =
        futures::future::join_all(jobs.iter().map(|job| fetch.fetch(&job.path))).await;
    for (job, payload) in jobs.iter().zip(payloads) {
        if session.is_current() {
            match payload.and_then(|data| loader.normalize(&data, &job.meta)) {
                Ok(records) => {
                    for record in records {
                        session.commit_record(record);
                    }
                }
                Err(error) => warn!("skipping {}: {:#}", job.path, error),
            }
        }
        session.file_loaded();
    }
    Ok(session.finalize())
}
