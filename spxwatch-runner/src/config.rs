//! Monitor configuration, loaded from TOML.
//!
//! Every section has defaults; only `[api]` must be filled in.
//! [`MonitorConfig::validate`] runs at startup, and configuration errors are
//! the only fatal errors in the monitor.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spxwatch_core::components::{CooldownParams, GateParams, TrendStrengthParams};
use spxwatch_core::data::{HttpSourceConfig, SessionWindow};
use spxwatch_core::domain::RegimeLabel;
use spxwatch_core::notify::WebhookConfig;
use spxwatch_core::oracle::{HeuristicParams, HttpOracleConfig};
use spxwatch_core::FeatureConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Http,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub source: SourceKind,
    #[serde(flatten)]
    pub http: HttpSourceConfig,
    /// Recording to replay when `source = "csv"`.
    pub csv_path: Option<PathBuf>,
}

/// Live session, or a historical day replayed from a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Live,
    Replay { date: NaiveDate, start: NaiveTime },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Grid spacing of the observation series, minutes.
    pub interval_min: u32,
    /// Sleep between iterations, seconds.
    pub fetch_interval_sec: u64,
    pub history_size: usize,
    pub mode: RunMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interval_min: 1,
            fetch_interval_sec: 60,
            history_size: 400,
            mode: RunMode::Live,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { rsi_period: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Monitoring starts here (wall clock, exchange-local).
    pub open: NaiveTime,
    /// The loop ends once the latest observation reaches this time.
    pub close: NaiveTime,
    /// Exchange close, the reference for minutes-to-close.
    pub market_close: NaiveTime,
    /// Seed the buffer with the previous business day before the first tick.
    pub seed_previous_day: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let window = SessionWindow::default();
        Self {
            open: window.open,
            close: window.close,
            market_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            seed_previous_day: true,
        }
    }
}

impl SessionConfig {
    pub fn window(&self) -> SessionWindow {
        SessionWindow {
            open: self.open,
            close: self.close,
        }
    }

    pub fn market_close_minute(&self) -> i64 {
        i64::from(self.market_close.hour()) * 60 + i64::from(self.market_close.minute())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Operator-declared day type.
    Fixed,
    #[default]
    TrendStrength,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub classifier: ClassifierKind,
    /// Label used by the fixed classifier.
    pub label: RegimeLabel,
    #[serde(flatten)]
    pub trend_strength: TrendStrengthParams,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::TrendStrength,
            label: RegimeLabel::RangeBound,
            trend_strength: TrendStrengthParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    #[default]
    Heuristic,
    Http,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub kind: OracleKind,
    pub heuristic: HeuristicParams,
    pub http: HttpOracleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub console: bool,
    /// Send gate rejections and no-setup verdicts at `Log` priority.
    pub notify_rejections: bool,
    pub webhook: Option<WebhookConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            console: true,
            notify_rejections: true,
            webhook: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_file: PathBuf,
    pub decision_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("last_alert_state.json"),
            decision_log: PathBuf::from("alert_log.csv"),
        }
    }
}

/// Complete monitor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub api: ApiConfig,
    pub runtime: RuntimeConfig,
    pub indicators: IndicatorConfig,
    pub session: SessionConfig,
    pub gate: GateParams,
    pub regime: RegimeConfig,
    pub cooldown: CooldownParams,
    pub oracle: OracleConfig,
    pub notify: NotifyConfig,
    pub paths: PathsConfig,
}

impl MonitorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| ConfigError::Invalid(msg);

        match self.api.source {
            SourceKind::Http if self.api.http.url.trim().is_empty() => {
                return Err(invalid("[api] url is required for the http source".into()));
            }
            SourceKind::Csv if self.api.csv_path.is_none() => {
                return Err(invalid("[api] csv_path is required for the csv source".into()));
            }
            _ => {}
        }

        let rt = &self.runtime;
        if rt.interval_min == 0 || 60 % rt.interval_min != 0 {
            return Err(invalid(format!(
                "[runtime] interval_min {} must be a positive divisor of 60",
                rt.interval_min
            )));
        }
        if rt.history_size == 0 {
            return Err(invalid("[runtime] history_size must be >= 1".into()));
        }
        if self.indicators.rsi_period < 2 {
            return Err(invalid("[indicators] rsi_period must be >= 2".into()));
        }

        self.session
            .window()
            .validate()
            .map_err(|e| invalid(format!("[session] {e}")))?;
        if self.session.market_close < self.session.close {
            return Err(invalid(
                "[session] market_close must not be before the monitoring close".into(),
            ));
        }

        self.gate.validate().map_err(|e| invalid(format!("[gate] {e}")))?;
        self.cooldown
            .validate()
            .map_err(|e| invalid(format!("[cooldown] {e}")))?;

        if self.oracle.kind == OracleKind::Http && self.oracle.http.url.trim().is_empty() {
            return Err(invalid("[oracle.http] url is required for the http oracle".into()));
        }
        if let Some(hook) = &self.notify.webhook {
            if hook.url.trim().is_empty() {
                return Err(invalid("[notify.webhook] url must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig {
            rsi_period: self.indicators.rsi_period,
            interval_min: self.runtime.interval_min,
            market_close_minute: self.session.market_close_minute(),
        }
    }

    /// BLAKE3 hash of the resolved configuration.
    ///
    /// Two runs with identical settings share a fingerprint; decision-log rows
    /// carry it so rows can be grouped by the parameters that produced them.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// First 16 hex characters of [`fingerprint`](Self::fingerprint).
    pub fn short_fingerprint(&self) -> String {
        self.fingerprint()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.api.http.url = "http://localhost:8080/spx".into();
        config
    }

    #[test]
    fn defaults_need_a_source_url() {
        assert!(MonitorConfig::default().validate().is_err());
        assert!(http_config().validate().is_ok());
    }

    #[test]
    fn fingerprint_deterministic_and_sensitive() {
        let a = http_config();
        let mut b = http_config();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        b.cooldown.cooldown_minutes = 30;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.short_fingerprint().len(), 16);
    }

    #[test]
    fn interval_must_divide_hour() {
        let mut c = http_config();
        c.runtime.interval_min = 7;
        assert!(c.validate().is_err());
        c.runtime.interval_min = 5;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn inverted_vix_bounds_rejected() {
        let mut c = http_config();
        c.gate.global.vix_floor = 35.0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn market_close_minute() {
        assert_eq!(SessionConfig::default().market_close_minute(), 960);
        assert_eq!(http_config().feature_config().market_close_minute, 960);
    }
}
