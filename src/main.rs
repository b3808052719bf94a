#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sensgraph::config;
use sensgraph::datamodel::MetricMap;
use sensgraph::format::{self, Precision};
use sensgraph::loader::json::JsonLoader;
use sensgraph::loader::mrtg::MrtgLoader;
use sensgraph::loader::nagios::NagiosLoader;
use sensgraph::loader::storage::{StorageLoader, StorageSource};
use sensgraph::loader::{run_reload, FileFetcher, SessionHandle, SourceLoader};
use sensgraph::pipeline::{aggregate, window};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Json,
    Mrtg,
    Storage,
    Nagios,
}

/// Loads monitoring indexes, runs the transformation pipeline, and prints
/// one JSON summary line per metric channel.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source format of the index files.
    #[arg(long, value_enum, default_value_t = SourceKind::Json)]
    source: SourceKind,

    /// Directory all index and log paths are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Time window, hours back from now; defaults to the configuration.
    #[arg(long)]
    interval_hours: Option<u32>,

    /// Report byte rates as bits per second.
    #[arg(long)]
    bits: bool,

    /// Index files, each optionally suffixed with `;port` preselections.
    #[arg(required = true)]
    sources: Vec<String>,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    config::load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    let cli = Cli::parse();
    let interval_hours = cli.interval_hours.unwrap_or(config.interval_hours);

    let loader: Box<dyn SourceLoader> = match cli.source {
        SourceKind::Json => Box::new(JsonLoader::from_config()?),
        SourceKind::Mrtg => Box::new(MrtgLoader::from_config()?),
        SourceKind::Storage => Box::new(StorageLoader::new(StorageSource::MDisk, interval_hours)),
        SourceKind::Nagios => Box::new(NagiosLoader),
    };
    let fetcher = FileFetcher::new(&cli.root);
    let handle = SessionHandle::new();

    let outcome = run_reload(loader.as_ref(), &fetcher, &cli.sources, &handle)
        .await?
        .context("reload superseded")?;

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0);
    let from = now_ms - interval_hours as i64 * 3_600_000;
    print_summary(&outcome.metrics, from, now_ms, cli.bits, config.max_points);
    Ok(())
}

fn print_summary(metrics: &MetricMap, from: i64, to: i64, bits: bool, max_points: usize) {
    for metric in metrics.values() {
        for (channel, series) in &metric.channels {
            let mut unit = metric.unit.for_channel(channel).to_string();
            let mut multiplier = 1.0;
            if bits && unit == "B/s" {
                multiplier = 8.0;
                unit = "b/s".to_string();
            }
            let visible =
                window::filter_window(series, from, to, multiplier, channel.uses_max(), max_points);
            let mean = aggregate::average(&visible, from, to)
                .map(|value| format::si(value, Precision::Fixed(2), &unit));
            let volume = aggregate::time_weighted_sum(&visible, from, to);
            let line = serde_json::json!({
                "key": metric.key,
                "name": metric.name,
                "host": metric.host,
                "group": metric.group,
                "channel": channel.to_string(),
                "unit": unit,
                "points": visible.len(),
                "average": mean,
                "volume": format::si(volume, Precision::Fixed(2), "iB"),
            });
            println!("{line}");
        }
    }
}
