//! spxwatch runner: configuration, logging, decision log and the poll loop.
//!
//! This crate builds on `spxwatch-core` to provide:
//! - TOML configuration with validation and a BLAKE3 fingerprint
//! - `tracing` subscriber setup (pretty or JSON)
//! - The append-only CSV decision log
//! - Wiring of providers, classifier, oracle and notifiers from config
//! - The monitor loop, live or replaying a historical session

pub mod config;
pub mod decision_log;
pub mod logging;
pub mod monitor;
pub mod setup;

pub use config::{ConfigError, MonitorConfig, RunMode};
pub use decision_log::{DecisionLog, DecisionLogError, DecisionRecord};
pub use logging::init_tracing;
pub use monitor::{Monitor, MonitorError, MonitorParts, RunSummary, Snapshot, TickOutcome};
pub use setup::{build_monitor, build_parts};
