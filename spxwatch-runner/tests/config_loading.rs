use std::io::Write;

use chrono::{NaiveDate, NaiveTime};
use spxwatch_core::domain::RegimeLabel;
use spxwatch_runner::config::{ClassifierKind, OracleKind, SourceKind};
use spxwatch_runner::{ConfigError, MonitorConfig, RunMode};

const FULL: &str = r#"
[api]
source = "http"
url = "https://snapshots.example.net/spx"
timeout_secs = 5
source_interval = "60"
[api.params]
symbol = "SPX"

[runtime]
interval_min = 5
fetch_interval_sec = 30
history_size = 300

[indicators]
rsi_period = 10

[session]
open = "09:45:00"
close = "14:00:00"
market_close = "16:00:00"
seed_previous_day = false

[gate.global]
vix_floor = 13.0
vix_ceiling = 28.0

[gate.range_bound]
dead_zone_low = 0.3
dead_zone_high = 0.7

[regime]
classifier = "fixed"
label = "trending"

[cooldown]
minutes = 30
confidence_threshold = 0.75
price_tolerance_points = 5.0

[oracle]
kind = "http"
[oracle.http]
url = "https://judge.example.net/decide"
timeout_secs = 45

[notify]
console = false
notify_rejections = false
[notify.webhook]
url = "https://hooks.example.net/spx"

[paths]
state_file = "var/state.json"
decision_log = "var/decisions.csv"
"#;

#[test]
fn full_file_round_trips_every_section() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();
    let config = MonitorConfig::from_file(file.path()).unwrap();

    assert_eq!(config.api.source, SourceKind::Http);
    assert_eq!(config.api.http.url, "https://snapshots.example.net/spx");
    assert_eq!(config.api.http.source_interval, "60");
    assert_eq!(config.api.http.params.get("symbol").map(String::as_str), Some("SPX"));
    assert_eq!(config.runtime.interval_min, 5);
    assert_eq!(config.runtime.mode, RunMode::Live);
    assert_eq!(config.indicators.rsi_period, 10);
    assert_eq!(config.session.close, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    assert!(!config.session.seed_previous_day);
    assert_eq!(config.gate.global.vix_floor, 13.0);
    // untouched keys keep their defaults
    assert_eq!(config.gate.global.min_minutes_to_close, 90);
    assert_eq!(config.gate.range_bound.dead_zone_high, 0.7);
    assert_eq!(config.regime.classifier, ClassifierKind::Fixed);
    assert_eq!(config.regime.label, RegimeLabel::Trending);
    assert_eq!(config.cooldown.cooldown_minutes, 30);
    assert_eq!(config.cooldown.price_tolerance_points, Some(5.0));
    assert_eq!(config.oracle.kind, OracleKind::Http);
    assert_eq!(config.oracle.http.timeout_secs, 45);
    assert!(!config.notify.console);
    assert!(config.notify.webhook.is_some());
    assert_eq!(config.paths.decision_log.to_str(), Some("var/decisions.csv"));
    assert_eq!(config.feature_config().interval_min, 5);
}

#[test]
fn minimal_file_uses_defaults() {
    let config = MonitorConfig::from_toml(
        r#"
        [api]
        url = "http://localhost:8080/spx"
        "#,
    )
    .unwrap();
    assert_eq!(config.runtime.interval_min, 1);
    assert_eq!(config.runtime.fetch_interval_sec, 60);
    assert_eq!(config.runtime.history_size, 400);
    assert_eq!(config.session.open, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(config.session.close, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    assert_eq!(config.cooldown.cooldown_minutes, 25);
    assert_eq!(config.cooldown.confidence_threshold, 0.7);
    assert_eq!(config.cooldown.price_tolerance_points, None);
    assert_eq!(config.oracle.kind, OracleKind::Heuristic);
    assert_eq!(config.regime.classifier, ClassifierKind::TrendStrength);
    assert_eq!(config.paths.state_file.to_str(), Some("last_alert_state.json"));
}

#[test]
fn replay_mode_table() {
    let config = MonitorConfig::from_toml(
        r#"
        [api]
        source = "csv"
        csv_path = "recordings/2026-01-29.csv"

        [runtime.mode.replay]
        date = "2026-01-29"
        start = "10:30:00"
        "#,
    )
    .unwrap();
    assert_eq!(
        config.runtime.mode,
        RunMode::Replay {
            date: NaiveDate::from_ymd_opt(2026, 1, 29).unwrap(),
            start: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        }
    );
}

#[test]
fn invalid_configs_are_reported() {
    let cases = [
        ("", "url is required"),
        ("[api]\nsource = \"csv\"", "csv_path is required"),
        ("[api]\nurl = \"http://x\"\n[runtime]\ninterval_min = 7", "divisor of 60"),
        ("[api]\nurl = \"http://x\"\n[session]\nopen = \"15:00:00\"", "[session]"),
        ("[api]\nurl = \"http://x\"\n[cooldown]\nconfidence_threshold = 1.5", "[cooldown]"),
        ("[api]\nurl = \"http://x\"\n[oracle]\nkind = \"http\"", "[oracle.http]"),
    ];
    for (toml, needle) in cases {
        match MonitorConfig::from_toml(toml) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains(needle), "{msg} / {needle}"),
            other => panic!("{toml:?}: expected invalid, got {other:?}"),
        }
    }
}

#[test]
fn syntax_errors_are_parse_errors() {
    assert!(matches!(
        MonitorConfig::from_toml("[api\nurl = 1"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        MonitorConfig::from_toml("[runtime]\ninterval_min = \"five\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        MonitorConfig::from_file(&dir.path().join("absent.toml")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn shipped_example_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("spxwatch.example.toml");
    let config = MonitorConfig::from_file(&path).unwrap();

    let mut expected = MonitorConfig::default();
    expected.api.http.url = "https://snapshots.example.net/spx".into();
    assert_eq!(config, expected);
}
