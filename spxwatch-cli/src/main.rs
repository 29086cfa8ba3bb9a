//! spxwatch CLI: run the monitor, inspect a snapshot, manage alert state.
//!
//! Commands:
//! - `run`: poll the feed through the session (live, or replay with `--date`)
//! - `snapshot`: fetch once and print features, regime and gate verdict
//! - `state show` / `state clear`: inspect or reset the persisted alert record
//! - `config check`: validate a config file and print its fingerprint

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use spxwatch_core::data::session::now_in_market;
use spxwatch_core::state::{AlertStore, JsonFileStore};
use spxwatch_runner::{build_monitor, init_tracing, MonitorConfig, RunMode};

#[derive(Parser)]
#[command(name = "spxwatch", about = "spxwatch: SPX 0-DTE premium-selling monitor")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and alert until the session window closes.
    Run {
        /// Path to a TOML config file.
        #[arg(long, default_value = "spxwatch.toml")]
        config: PathBuf,

        /// Replay this trading day (YYYY-MM-DD) instead of running live.
        #[arg(long)]
        date: Option<String>,

        /// Replay start time (HH:MM). Defaults to the session open.
        #[arg(long)]
        start: Option<String>,

        /// Stop after this many iterations.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Fetch once and print the latest features and gate verdict.
    Snapshot {
        #[arg(long, default_value = "spxwatch.toml")]
        config: PathBuf,

        /// Historical day (YYYY-MM-DD). Defaults to live.
        #[arg(long)]
        date: Option<String>,

        /// Evaluate as of this time (HH:MM) on `--date`.
        #[arg(long)]
        at: Option<String>,
    },
    /// Persisted alert state.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// Configuration helpers.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the last alert and the remaining cooldown.
    Show {
        #[arg(long, default_value = "spxwatch.toml")]
        config: PathBuf,
    },
    /// Delete the persisted alert record, re-arming alerts immediately.
    Clear {
        #[arg(long, default_value = "spxwatch.toml")]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file and print its fingerprint.
    Check {
        #[arg(long, default_value = "spxwatch.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Run {
            config,
            date,
            start,
            max_ticks,
        } => run_monitor(&config, date.as_deref(), start.as_deref(), max_ticks),
        Commands::Snapshot { config, date, at } => {
            run_snapshot(&config, date.as_deref(), at.as_deref())
        }
        Commands::State { action } => match action {
            StateAction::Show { config } => run_state_show(&config),
            StateAction::Clear { config } => run_state_clear(&config),
        },
        Commands::Config { action } => match action {
            ConfigAction::Check { config } => run_config_check(&config),
        },
    }
}

fn load_config(path: &Path) -> Result<MonitorConfig> {
    MonitorConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid time '{s}'"))
}

/// Apply `--date`/`--start` on top of the file's run mode.
fn apply_replay(config: &mut MonitorConfig, date: Option<&str>, start: Option<&str>) -> Result<()> {
    if let Some(date) = date {
        let start = match start {
            Some(s) => parse_time(s)?,
            None => config.session.open,
        };
        config.runtime.mode = RunMode::Replay {
            date: parse_date(date)?,
            start,
        };
    } else if start.is_some() {
        anyhow::bail!("--start requires --date");
    }
    Ok(())
}

fn run_monitor(
    path: &Path,
    date: Option<&str>,
    start: Option<&str>,
    max_ticks: Option<u64>,
) -> Result<()> {
    let mut config = load_config(path)?;
    apply_replay(&mut config, date, start)?;

    let mut monitor = build_monitor(&config)?;
    if let Some(max) = max_ticks {
        monitor = monitor.with_max_ticks(max);
    }
    let summary = monitor.run();

    println!("=== Run Summary ===");
    println!("Iterations:   {}", summary.ticks);
    println!("Alerts:       {}", summary.alerts);
    println!("Rejected:     {}", summary.rejected);
    println!("No setup:     {}", summary.no_setup);
    println!("Cooling:      {}", summary.cooling);
    println!("No new data:  {}", summary.no_data);
    println!("Faults:       {}", summary.faults);
    println!("Decision log: {}", config.paths.decision_log.display());
    Ok(())
}

fn run_snapshot(path: &Path, date: Option<&str>, at: Option<&str>) -> Result<()> {
    let mut config = load_config(path)?;
    if date.is_some() {
        let at = at
            .map(String::from)
            .unwrap_or_else(|| config.session.close.format("%H:%M").to_string());
        apply_replay(&mut config, date, Some(&at))?;
    } else {
        config.runtime.mode = RunMode::Live;
    }

    let mut monitor = build_monitor(&config)?;
    monitor.seed_history();
    let Some(snapshot) = monitor.snapshot()? else {
        println!("No observations available yet.");
        return Ok(());
    };

    let out = serde_json::json!({
        "regime": snapshot.regime,
        "gate": snapshot.gate,
        "features": snapshot.features,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_state_show(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let store = JsonFileStore::new(&config.paths.state_file);
    let Some(state) = store.load()? else {
        println!("No alert recorded ({}).", store.path().display());
        return Ok(());
    };

    println!("State file:  {}", store.path().display());
    match state.last_alert_time {
        Some(at) => {
            println!("Last alert:  {}", at.format("%Y-%m-%d %H:%M:%S %:z"));
            let elapsed = (now_in_market() - at).num_seconds() as f64 / 60.0;
            let remaining = config.cooldown.cooldown_minutes as f64 - elapsed;
            if remaining > 0.0 {
                println!("Cooldown:    {remaining:.1} min remaining");
            } else {
                println!("Cooldown:    elapsed; alerts armed");
            }
        }
        None => println!("Last alert:  none"),
    }
    if let Some(price) = state.last_alert_price {
        println!("Alert price: {price:.2}");
    }
    Ok(())
}

fn run_state_clear(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let mut store = JsonFileStore::new(&config.paths.state_file);
    store.clear()?;
    println!("Cleared {}", store.path().display());
    Ok(())
}

fn run_config_check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!("Config OK: {}", path.display());
    println!("Fingerprint: {}", config.fingerprint());
    println!("Source:      {:?}", config.api.source);
    println!("Mode:        {:?}", config.runtime.mode);
    println!("Oracle:      {:?}", config.oracle.kind);
    Ok(())
}
