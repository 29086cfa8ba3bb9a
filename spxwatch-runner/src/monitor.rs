//! The poll loop.
//!
//! One iteration: fetch → append → recompute → cooldown check → classify →
//! gate → oracle → dedup → notify/persist/log. Faults from the provider or
//! oracle end the iteration, never the loop. Only configuration errors are
//! fatal, and those surface from [`Monitor::new`].

use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use thiserror::Error;

use spxwatch_core::components::{
    AdmissionGate, AlertDeduplicator, AlertVerdict, CooldownCheck, RegimeClassifier,
};
use spxwatch_core::data::session::{now_in_market, previous_business_day};
use spxwatch_core::data::{DataError, FetchRequest, FetchTarget, ObservationProvider, SessionWindow};
use spxwatch_core::domain::{
    FeatureVector, GateDecision, GateStage, Observation, RegimeLabel, TradeAction,
};
use spxwatch_core::notify::{alert_message, Notifier, Priority};
use spxwatch_core::oracle::{DecisionOracle, OracleError, OracleRequest};
use spxwatch_core::state::AlertStore;
use spxwatch_core::{BufferError, FeatureEngine, TimeSeriesBuffer};

use crate::config::{ConfigError, MonitorConfig, RunMode};
use crate::decision_log::{DecisionLog, DecisionRecord};

/// Errors from a monitor iteration (or, for `Config`, from construction).
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    /// A collaborator could not be constructed.
    #[error("setup failed: {0}")]
    Setup(String),
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing newer than the buffer's latest observation.
    NoData,
    Cooling { elapsed_min: f64, remaining_min: f64 },
    Rejected { stage: GateStage, reason: String },
    /// The oracle was consulted but no alert fired.
    NoSetup { verdict: AlertVerdict },
    Alerted { trade: TradeAction, confidence: f64 },
    SessionEnded,
}

/// Counters over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub no_data: u64,
    pub cooling: u64,
    pub rejected: u64,
    pub no_setup: u64,
    pub alerts: u64,
    pub faults: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::NoData => self.no_data += 1,
            TickOutcome::Cooling { .. } => self.cooling += 1,
            TickOutcome::Rejected { .. } => self.rejected += 1,
            TickOutcome::NoSetup { .. } => self.no_setup += 1,
            TickOutcome::Alerted { .. } => self.alerts += 1,
            TickOutcome::SessionEnded => {}
        }
    }
}

/// Features, regime and gate verdict for the latest observation, without
/// consulting the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub features: FeatureVector,
    pub regime: RegimeLabel,
    pub gate: GateDecision,
}

/// Injected collaborators. Tests swap in deterministic doubles.
pub struct MonitorParts {
    pub provider: Box<dyn ObservationProvider>,
    pub classifier: Box<dyn RegimeClassifier>,
    pub oracle: Box<dyn DecisionOracle>,
    pub notifier: Box<dyn Notifier>,
    pub store: Box<dyn AlertStore>,
    pub decision_log: Option<DecisionLog>,
}

pub struct Monitor {
    provider: Box<dyn ObservationProvider>,
    classifier: Box<dyn RegimeClassifier>,
    oracle: Box<dyn DecisionOracle>,
    notifier: Box<dyn Notifier>,
    decision_log: Option<DecisionLog>,

    engine: FeatureEngine,
    gate: AdmissionGate,
    dedup: AlertDeduplicator,
    buffer: TimeSeriesBuffer,

    interval_min: u32,
    poll_interval: Duration,
    window: SessionWindow,
    seed_previous_day: bool,
    notify_rejections: bool,
    fingerprint: String,

    target: FetchTarget,
    /// Replay cursor; `None` in live mode.
    cutoff: Option<NaiveTime>,
    max_ticks: Option<u64>,
}

impl Monitor {
    pub fn new(config: &MonitorConfig, parts: MonitorParts) -> Result<Self, MonitorError> {
        config.validate()?;

        let (target, cutoff) = match config.runtime.mode {
            RunMode::Live => (FetchTarget::Live, None),
            RunMode::Replay { date, start } => (FetchTarget::Date(date), Some(start)),
        };

        Ok(Self {
            provider: parts.provider,
            classifier: parts.classifier,
            oracle: parts.oracle,
            notifier: parts.notifier,
            decision_log: parts.decision_log,
            engine: FeatureEngine::new(config.feature_config()),
            gate: AdmissionGate::new(config.gate),
            dedup: AlertDeduplicator::new(config.cooldown, parts.store),
            buffer: TimeSeriesBuffer::try_new(config.runtime.history_size)?,
            interval_min: config.runtime.interval_min,
            poll_interval: Duration::from_secs(config.runtime.fetch_interval_sec),
            window: config.session.window(),
            seed_previous_day: config.session.seed_previous_day,
            notify_rejections: config.notify.notify_rejections,
            fingerprint: config.short_fingerprint(),
            target,
            cutoff,
            max_ticks: None,
        })
    }

    /// Stop `run` after this many iterations.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn buffer(&self) -> &TimeSeriesBuffer {
        &self.buffer
    }

    pub fn dedup(&self) -> &AlertDeduplicator {
        &self.dedup
    }

    pub fn cutoff(&self) -> Option<NaiveTime> {
        self.cutoff
    }

    fn is_replay(&self) -> bool {
        self.cutoff.is_some()
    }

    fn session_date(&self) -> NaiveDate {
        self.target.resolve_date()
    }

    /// Load the previous business day so indicators are warm at the open.
    /// Returns the number of observations accepted; failures are logged.
    pub fn seed_history(&mut self) -> usize {
        if !self.seed_previous_day {
            return 0;
        }
        let day = previous_business_day(self.session_date());
        let request = FetchRequest::new(self.interval_min, FetchTarget::Date(day));
        match self.provider.fetch(&request) {
            Ok(observations) => {
                let accepted = self.buffer.seed(drop_void(observations));
                tracing::info!(%day, accepted, "seeded history from previous session");
                accepted
            }
            Err(e) => {
                tracing::warn!(%day, error = %e, "could not seed history; starting cold");
                0
            }
        }
    }

    /// Append observations newer than (or equal to) the current latest.
    /// Returns how many strictly newer ones arrived.
    fn ingest(&mut self, observations: Vec<Observation>) -> Result<usize, BufferError> {
        let before = self.buffer.max_timestamp();
        let mut fresh = 0;
        for obs in drop_void(observations) {
            match before {
                Some(max) if obs.timestamp < max => continue,
                Some(max) if obs.timestamp == max => {
                    self.buffer.append(obs)?;
                }
                _ => {
                    self.buffer.append(obs)?;
                    fresh += 1;
                }
            }
        }
        Ok(fresh)
    }

    fn advance_cutoff(&mut self) {
        if let Some(t) = self.cutoff {
            let (next, wrapped) =
                t.overflowing_add_signed(ChronoDuration::minutes(i64::from(self.interval_min)));
            // past midnight: park at the last second of the day so the replay ends
            self.cutoff = Some(if wrapped != 0 {
                NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(t)
            } else {
                next
            });
        }
    }

    /// Fetch and append; `Ok(None)` when nothing new arrived.
    fn refresh(&mut self) -> Result<Option<FeatureVector>, MonitorError> {
        let request =
            FetchRequest::new(self.interval_min, self.target).with_cutoff(self.cutoff);
        let observations = self.provider.fetch(&request)?;
        let fresh = self.ingest(observations)?;
        self.advance_cutoff();

        if fresh == 0 {
            return Ok(None);
        }
        Ok(self.engine.latest(&self.buffer))
    }

    fn session_over(&self, features: &FeatureVector) -> bool {
        features.timestamp.date_naive() == self.session_date()
            && self.window.has_ended(features.timestamp.time())
    }

    fn send(&mut self, priority: Priority, message: &str) {
        if let Err(e) = self.notifier.notify(priority, message) {
            tracing::warn!(%priority, error = %e, "notification failed");
        }
    }

    /// One iteration of the loop.
    pub fn tick(&mut self) -> Result<TickOutcome, MonitorError> {
        if self.cutoff.is_some_and(|cutoff| cutoff > self.window.close) {
            return Ok(TickOutcome::SessionEnded);
        }

        let Some(features) = self.refresh()? else {
            tracing::debug!("no new observation");
            return Ok(TickOutcome::NoData);
        };
        if self.session_over(&features) {
            tracing::info!(at = %features.timestamp, "session window closed");
            return Ok(TickOutcome::SessionEnded);
        }
        if !features.is_warm() {
            tracing::debug!(at = %features.timestamp, rows = self.buffer.len(), "indicators still warming up");
        }

        let stamp = features.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();

        match self.dedup.check_cooldown(features.timestamp) {
            CooldownCheck::Cooling {
                elapsed_min,
                remaining_min,
            } => {
                tracing::info!(
                    at = %stamp,
                    elapsed_min,
                    cooldown_min = self.dedup.params().cooldown_minutes,
                    "cooldown active"
                );
                return Ok(TickOutcome::Cooling {
                    elapsed_min,
                    remaining_min,
                });
            }
            CooldownCheck::Rearmed { .. } | CooldownCheck::Armed => {}
        }

        let regime = self.classifier.classify(&features);
        let gate = self.gate.evaluate(&features, &regime);
        if let GateDecision::Reject { stage, reason } = gate {
            tracing::info!(at = %stamp, %regime, %stage, %reason, "gate rejected");
            if self.notify_rejections {
                self.send(Priority::Log, &format!("{stamp} -- skipped ({stage}): {reason}"));
            }
            return Ok(TickOutcome::Rejected { stage, reason });
        }
        tracing::info!(at = %stamp, %regime, "gate admitted; consulting oracle");

        let decision = self
            .oracle
            .decide(&OracleRequest::new(features.clone(), regime.clone()))?;

        let verdict = self.dedup.evaluate(&decision, features.price);
        let alerted = match verdict {
            AlertVerdict::Fire(trade) => {
                self.send(Priority::Alert, &alert_message(&decision, &features));
                if let Err(e) = self.dedup.record_alert(trade, features.timestamp, features.price) {
                    tracing::warn!(error = %e, "failed to persist alert state");
                }
                tracing::info!(
                    at = %stamp,
                    %trade,
                    confidence = decision.confidence,
                    "alert sent"
                );
                true
            }
            ref other => {
                tracing::info!(at = %stamp, verdict = ?other, "no clean setup");
                if self.notify_rejections {
                    self.send(Priority::Log, &format!("{stamp} -- no clean setup"));
                }
                false
            }
        };

        if let Some(log) = &self.decision_log {
            let record =
                DecisionRecord::new(&features, &regime, &decision, alerted, &self.fingerprint);
            if let Err(e) = log.append(&record) {
                tracing::warn!(path = %log.path().display(), error = %e, "decision log write failed");
            }
        }

        Ok(match verdict {
            AlertVerdict::Fire(trade) => TickOutcome::Alerted {
                trade,
                confidence: decision.confidence,
            },
            other => TickOutcome::NoSetup { verdict: other },
        })
    }

    /// Fetch, append and evaluate up to the gate, without oracle or notifier.
    pub fn snapshot(&mut self) -> Result<Option<Snapshot>, MonitorError> {
        let request =
            FetchRequest::new(self.interval_min, self.target).with_cutoff(self.cutoff);
        let observations = self.provider.fetch(&request)?;
        self.ingest(observations)?;
        let Some(features) = self.engine.latest(&self.buffer) else {
            return Ok(None);
        };
        let regime = self.classifier.classify(&features);
        let gate = self.gate.evaluate(&features, &regime);
        Ok(Some(Snapshot {
            features,
            regime,
            gate,
        }))
    }

    /// Seed, then iterate until the session ends.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        self.seed_history();
        tracing::info!(
            provider = self.provider.name(),
            oracle = self.oracle.name(),
            classifier = self.classifier.name(),
            session = %self.target,
            config = %self.fingerprint,
            "monitor started"
        );

        loop {
            if self.max_ticks.is_some_and(|max| summary.ticks >= max) {
                tracing::info!(ticks = summary.ticks, "tick limit reached");
                break;
            }

            if !self.is_replay() {
                let now = now_in_market().time();
                if self.window.is_before_open(now) {
                    tracing::info!(%now, open = %self.window.open, "waiting for market window");
                    std::thread::sleep(Duration::from_secs(60));
                    continue;
                }
                if self.window.has_ended(now) {
                    tracing::info!(%now, "market window closed; shutting down");
                    break;
                }
            }

            match self.tick() {
                Ok(TickOutcome::SessionEnded) => {
                    summary.record(&TickOutcome::SessionEnded);
                    break;
                }
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    summary.ticks += 1;
                    summary.faults += 1;
                    tracing::warn!(error = %e, "iteration failed");
                }
            }

            std::thread::sleep(self.poll_interval);
        }

        tracing::info!(?summary, "monitor stopped");
        summary
    }
}

/// Rows with a missing or non-finite field are dropped before they reach the buffer.
fn drop_void(observations: Vec<Observation>) -> Vec<Observation> {
    let total = observations.len();
    let kept: Vec<Observation> = observations.into_iter().filter(|o| !o.is_void()).collect();
    if kept.len() < total {
        tracing::warn!(dropped = total - kept.len(), "skipping observations with missing fields");
    }
    kept
}
