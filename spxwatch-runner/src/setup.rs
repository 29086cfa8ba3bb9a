//! Build the monitor's collaborators from configuration.

use std::sync::Arc;

use spxwatch_core::components::{FixedRegime, RegimeClassifier, TrendStrengthClassifier};
use spxwatch_core::data::{CircuitBreaker, CsvProvider, HttpProvider, ObservationProvider};
use spxwatch_core::notify::{ConsoleNotifier, Notifier, NotifierSet, WebhookNotifier};
use spxwatch_core::oracle::{DecisionOracle, HeuristicOracle, HttpOracle};
use spxwatch_core::state::{AlertStore, JsonFileStore};

use crate::config::{ClassifierKind, MonitorConfig, OracleKind, SourceKind};
use crate::decision_log::DecisionLog;
use crate::monitor::{Monitor, MonitorError, MonitorParts};

pub fn build_provider(config: &MonitorConfig) -> Result<Box<dyn ObservationProvider>, MonitorError> {
    match config.api.source {
        SourceKind::Http => {
            let breaker = Arc::new(CircuitBreaker::for_session());
            let provider = HttpProvider::new(config.api.http.clone(), breaker)
                .map_err(|e| MonitorError::Setup(e.to_string()))?;
            Ok(Box::new(provider))
        }
        SourceKind::Csv => {
            let path = config.api.csv_path.as_ref().ok_or_else(|| {
                MonitorError::Setup("[api] csv_path is required for the csv source".into())
            })?;
            Ok(Box::new(CsvProvider::new(path)))
        }
    }
}

pub fn build_classifier(config: &MonitorConfig) -> Box<dyn RegimeClassifier> {
    match config.regime.classifier {
        ClassifierKind::Fixed => Box::new(FixedRegime::new(config.regime.label.clone())),
        ClassifierKind::TrendStrength => {
            Box::new(TrendStrengthClassifier::new(config.regime.trend_strength))
        }
    }
}

pub fn build_oracle(config: &MonitorConfig) -> Result<Box<dyn DecisionOracle>, MonitorError> {
    match config.oracle.kind {
        OracleKind::Heuristic => Ok(Box::new(HeuristicOracle::new(config.oracle.heuristic))),
        OracleKind::Http => {
            let oracle =
                HttpOracle::new(&config.oracle.http).map_err(|e| MonitorError::Setup(e.to_string()))?;
            Ok(Box::new(oracle))
        }
    }
}

pub fn build_notifier(config: &MonitorConfig) -> Result<Box<dyn Notifier>, MonitorError> {
    let mut set = NotifierSet::new();
    if config.notify.console {
        set.push(Box::new(ConsoleNotifier::stdout()));
    }
    if let Some(hook) = &config.notify.webhook {
        let webhook =
            WebhookNotifier::new(hook.clone()).map_err(|e| MonitorError::Setup(e.to_string()))?;
        set.push(Box::new(webhook));
    }
    if set.is_empty() {
        tracing::warn!("no notification sinks configured; alerts go to the log only");
    }
    Ok(Box::new(set))
}

pub fn build_store(config: &MonitorConfig) -> Box<dyn AlertStore> {
    Box::new(JsonFileStore::new(&config.paths.state_file))
}

/// Every production collaborator, as selected by `config`.
pub fn build_parts(config: &MonitorConfig) -> Result<MonitorParts, MonitorError> {
    config.validate()?;
    Ok(MonitorParts {
        provider: build_provider(config)?,
        classifier: build_classifier(config),
        oracle: build_oracle(config)?,
        notifier: build_notifier(config)?,
        store: build_store(config),
        decision_log: Some(DecisionLog::new(&config.paths.decision_log)),
    })
}

pub fn build_monitor(config: &MonitorConfig) -> Result<Monitor, MonitorError> {
    let parts = build_parts(config)?;
    Monitor::new(config, parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_config(dir: &std::path::Path) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.api.source = SourceKind::Csv;
        config.api.csv_path = Some(dir.join("feed.csv"));
        config.paths.state_file = dir.join("state.json");
        config.paths.decision_log = dir.join("log.csv");
        config
    }

    #[test]
    fn csv_source_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let parts = build_parts(&csv_config(dir.path())).unwrap();
        assert_eq!(parts.provider.name(), "csv");
        assert_eq!(parts.oracle.name(), "heuristic");
        assert_eq!(parts.classifier.name(), "trend_strength");
        assert!(parts.decision_log.is_some());
    }

    #[test]
    fn fixed_classifier_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = csv_config(dir.path());
        config.regime.classifier = ClassifierKind::Fixed;
        assert_eq!(build_classifier(&config).name(), "fixed");
    }

    #[test]
    fn missing_oracle_key_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = csv_config(dir.path());
        config.oracle.kind = OracleKind::Http;
        config.oracle.http.url = "http://localhost:9/decide".into();
        config.oracle.http.api_key_env = Some("SPXWATCH_TEST_KEY_THAT_IS_NEVER_SET".into());
        assert!(matches!(build_parts(&config), Err(MonitorError::Setup(_))));
    }

    #[test]
    fn invalid_config_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = csv_config(dir.path());
        config.api.csv_path = None;
        assert!(matches!(build_parts(&config), Err(MonitorError::Config(_))));
    }
}
