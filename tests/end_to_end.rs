use sensgraph::datamodel::{Channel, NetworkChannel, StorageChannel};
use sensgraph::loader::json::JsonLoader;
use sensgraph::loader::nagios::NagiosLoader;
use sensgraph::loader::storage::{StorageLoader, StorageSource};
use sensgraph::loader::{run_reload, FileFetcher, SessionHandle};
use sensgraph::pipeline::{aggregate, window};
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_json_tree_to_metric_map() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "logs/index.json",
        r#"{"ip": "10.0.0.1", "ifs": {
            "1": {"ifDescr": "eth0", "ifAlias": "uplink", "log": "sw_1.log"},
            "2": {"ifDescr": "Backbone", "log": "sw_2.log"}
        }}"#,
    );
    write(
        dir.path(),
        "logs/sw_1.log",
        "1000 999 999 9 9\n1000 100 200 3 4\n1060 110 210 5 6\n",
    );
    write(dir.path(), "logs/sw_2.log", "1000 1 1 1 1\n1000 7 7 7 7\n");

    let loader = JsonLoader::new(vec![regex::Regex::new("^Backbone$").unwrap()]);
    let fetcher = FileFetcher::new(dir.path());
    let handle = SessionHandle::new();
    let outcome = run_reload(&loader, &fetcher, &["logs/index.json".into()], &handle)
        .await
        .unwrap()
        .unwrap();

    // The excluded interface never registered a key.
    assert_eq!(outcome.metrics.len(), 1);
    let metric = &outcome.metrics["10_0_0_11"];
    assert_eq!(metric.name, "uplink");
    let inbound = metric.channel(Channel::Network(NetworkChannel::In));
    assert_eq!(inbound.len(), 2);
    assert_eq!(inbound[0].value, 100.0);
    let negated = metric.channel(Channel::Network(NetworkChannel::InNeg));
    assert_eq!(negated[0].value, -100.0);

    // Tooltip numbers for the loaded window.
    let visible = window::filter_window(inbound, 0, i64::MAX, 1.0, false, 400);
    assert_eq!(aggregate::average(&visible, 0, i64::MAX), Some(105.0));
    // The older reading (100 B/s) covers the 60 s up to the newest one.
    assert_eq!(
        aggregate::time_weighted_sum(&visible, 0, i64::MAX),
        100.0 * 60.0
    );
}

#[tokio::test]
async fn test_storwize_nodes_rate_and_merge() {
    let dir = tempfile::tempdir().unwrap();
    let stats = |start: i64| {
        format!(
            r#"<stats>
<diskStatsColl timestamp="2015-11-12 11:20:38" sizeUnits="512B">
  <mdsk idx="0" id="array0" rb="{start}"/>
</diskStatsColl>
<diskStatsColl timestamp="2015-11-12 11:21:38" sizeUnits="512B">
  <mdsk idx="0" id="array0" rb="{}"/>
</diskStatsColl>
</stats>"#,
            start + 60
        )
    };
    write(
        dir.path(),
        "stats/index.html",
        r#"<a href="Nm_stats_78G00PG-1_151112_112038">a</a>
<a href="Nm_stats_78G00PG-2_151112_112038">b</a>"#,
    );
    write(dir.path(), "stats/Nm_stats_78G00PG-1_151112_112038", &stats(0));
    write(dir.path(), "stats/Nm_stats_78G00PG-2_151112_112038", &stats(1000));

    // 2015-11-12 12:00:00 UTC
    let now_ms = 1_447_329_600_000;
    let loader = StorageLoader::with_now(StorageSource::MDisk, 24, now_ms);
    let fetcher = FileFetcher::new(dir.path());
    let handle = SessionHandle::new();
    let outcome = run_reload(&loader, &fetcher, &["stats/index.html".into()], &handle)
        .await
        .unwrap()
        .unwrap();

    let metric = &outcome.metrics["array0"];
    let read_bytes = metric.channel(Channel::Storage(StorageChannel::ReadBytes));
    assert_eq!(read_bytes.len(), 1);
    // Each node moved 60 blocks of 512 B over 60 s: 512 B/s per node,
    // stacked across the two controllers.
    assert_eq!(read_bytes[0].value, 2.0 * 512.0);
}

#[tokio::test]
async fn test_nagios_tree_counter_and_gauge() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "perf/index.html", "./www/nrpe_eth0/rx_bytes\n./www/PING/pl\n");
    write(
        dir.path(),
        "perf/www/nrpe_eth0/rx_bytes",
        "www\tnrpe_eth0\trx_bytes\tc\t1\t2\t0\t9\n1000 0\n1010 1000\n",
    );
    write(
        dir.path(),
        "perf/www/PING/pl",
        "www\tPING\tpl\t%\t30\t60\t0\n1000 0\n1010 3\n",
    );

    let fetcher = FileFetcher::new(dir.path());
    let handle = SessionHandle::new();
    let outcome = run_reload(&NagiosLoader, &fetcher, &["perf/index.html".into()], &handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.metrics.len(), 2);

    // The counter was rate-converted: 1000 B over 10 s.
    let counter = &outcome.metrics["www/nrpe_eth0/rx_bytes"];
    let series = counter.channel(Channel::Network(NetworkChannel::In));
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].value, 100.0);
    assert_eq!(counter.group, Some("network"));

    // The gauge kept its raw readings.
    let gauge = &outcome.metrics["www/PING/pl"];
    let series = gauge.channel(Channel::Network(NetworkChannel::In));
    assert_eq!(series.len(), 2);
    assert_eq!(series[1].value, 3.0);
}

#[tokio::test]
async fn test_fetch_failures_do_not_block_the_reload() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "logs/index.json",
        r#"{"ip": "10.0.0.1", "ifs": {
            "1": {"ifDescr": "eth0", "log": "sw_1.log"},
            "2": {"ifDescr": "eth1", "log": "missing.log"}
        }}"#,
    );
    write(dir.path(), "logs/sw_1.log", "header\n1000 1 2 3 4\n1060 5 6 7 8\n");

    let loader = JsonLoader::new(vec![]);
    let fetcher = FileFetcher::new(dir.path());
    let handle = SessionHandle::new();
    let outcome = run_reload(&loader, &fetcher, &["logs/index.json".into()], &handle)
        .await
        .unwrap()
        .unwrap();

    // The missing file's contribution is simply absent; the rest loaded.
    assert_eq!(outcome.metrics.len(), 1);
    assert!(outcome.metrics.contains_key("10_0_0_11"));
}
