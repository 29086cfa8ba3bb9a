//! Append-only CSV log of oracle-evaluated snapshots.
//!
//! One row per oracle consultation, alerted or not. The header is written
//! only when the file is new or empty, so the log survives restarts.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use spxwatch_core::domain::{FeatureVector, RegimeLabel, TradeDecision};

#[derive(Debug, Error)]
pub enum DecisionLogError {
    #[error("decision log I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decision log write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// One decision-log row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp: String,
    pub price: f64,
    pub expected_move: f64,
    pub otm_premium: f64,
    pub vix: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub band_position: Option<f64>,
    pub premium_ratio: Option<f64>,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub ema50: Option<f64>,
    pub ema21_slope_5m: Option<f64>,
    pub ema21_slope_15m: Option<f64>,
    pub ema21_slope_30m: Option<f64>,
    pub ret_5m_pct: Option<f64>,
    pub ret_15m_pct: Option<f64>,
    pub ret_30m_pct: Option<f64>,
    pub time_to_close_min: i64,
    pub regime: String,
    pub trade: String,
    pub confidence: f64,
    /// Joined with "; ".
    pub reasons: String,
    pub risk_flags: String,
    pub alerted: bool,
    pub config_fingerprint: String,
}

impl DecisionRecord {
    pub fn new(
        features: &FeatureVector,
        regime: &RegimeLabel,
        decision: &TradeDecision,
        alerted: bool,
        config_fingerprint: &str,
    ) -> Self {
        Self {
            timestamp: features.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            price: features.price,
            expected_move: features.expected_move,
            otm_premium: features.otm_premium,
            vix: features.vix,
            rsi: features.rsi,
            macd: features.macd,
            macd_signal: features.macd_signal,
            macd_hist: features.macd_hist,
            bb_upper: features.bb_upper,
            bb_middle: features.bb_middle,
            bb_lower: features.bb_lower,
            band_position: features.band_position,
            premium_ratio: features.premium_ratio,
            ema9: features.ema9,
            ema21: features.ema21,
            ema50: features.ema50,
            ema21_slope_5m: features.ema21_slope_5m,
            ema21_slope_15m: features.ema21_slope_15m,
            ema21_slope_30m: features.ema21_slope_30m,
            ret_5m_pct: features.ret_5m_pct,
            ret_15m_pct: features.ret_15m_pct,
            ret_30m_pct: features.ret_30m_pct,
            time_to_close_min: features.minutes_to_close,
            regime: regime.as_str().to_string(),
            trade: decision.trade_label().to_string(),
            confidence: decision.confidence,
            reasons: decision.reasons.join("; "),
            risk_flags: decision.risk_flags.join("; "),
            alerted,
            config_fingerprint: config_fingerprint.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> DecisionLogError {
        DecisionLogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub fn append(&self, record: &DecisionRecord) -> Result<(), DecisionLogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        let needs_header = file.metadata().map_err(|e| self.io_err(e))?.len() == 0;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        wtr.serialize(record)?;
        wtr.flush().map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Read every row back (for inspection and tests).
    pub fn read_all(&self) -> Result<Vec<DecisionRecord>, DecisionLogError> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let rows = rdr.deserialize().collect::<Result<Vec<DecisionRecord>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use spxwatch_core::domain::TradeAction;

    fn features() -> FeatureVector {
        FeatureVector {
            timestamp: FixedOffset::west_opt(5 * 3600)
                .unwrap()
                .with_ymd_and_hms(2026, 1, 29, 11, 15, 0)
                .unwrap(),
            price: 6010.25,
            expected_move: 42.0,
            otm_premium: 5.5,
            vix: 17.2,
            rsi: Some(66.4),
            macd: Some(1.2),
            macd_signal: Some(1.5),
            macd_hist: Some(-0.3),
            bb_upper: Some(6012.0),
            bb_middle: Some(6003.0),
            bb_lower: Some(5994.0),
            band_position: Some(0.9),
            premium_ratio: None,
            minutes_to_close: 285,
            ema9: Some(6008.5),
            ema21: Some(6005.0),
            ema50: None,
            ema21_slope_5m: Some(0.12),
            ema21_slope_15m: Some(-0.35),
            ema21_slope_30m: Some(0.4),
            ret_5m_pct: Some(0.05),
            ret_15m_pct: Some(-0.125),
            ret_30m_pct: None,
        }
    }

    fn decision() -> TradeDecision {
        TradeDecision {
            trade: Some(TradeAction::SellCall),
            confidence: 0.55,
            reasons: vec!["upper band".into(), "RSI 66".into()],
            risk_flags: vec!["late-day gamma".into()],
        }
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("logs").join("decisions.csv"));
        let record = DecisionRecord::new(&features(), &RegimeLabel::RangeBound, &decision(), false, "abc");
        log.append(&record).unwrap();
        log.append(&record).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches("config_fingerprint").count(), 1);
        assert_eq!(text.lines().count(), 3);

        let rows = log.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], record);
    }

    #[test]
    fn row_content() {
        let record = DecisionRecord::new(&features(), &RegimeLabel::RangeBound, &decision(), true, "f00d");
        assert_eq!(record.timestamp, "2026-01-29 11:15:00");
        assert_eq!(record.regime, "range_bound");
        assert_eq!(record.trade, "SELL_CALL");
        assert_eq!(record.reasons, "upper band; RSI 66");
        assert_eq!(record.premium_ratio, None);
        assert!(record.alerted);
    }

    #[test]
    fn trend_inputs_survive_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path().join("decisions.csv"));
        log.append(&DecisionRecord::new(&features(), &RegimeLabel::Trending, &decision(), false, "abc"))
            .unwrap();

        let header = std::fs::read_to_string(log.path()).unwrap();
        assert!(header.starts_with("timestamp,price,expected_move,otm_premium,vix,"));

        let row = &log.read_all().unwrap()[0];
        assert_eq!(row.otm_premium, 5.5);
        assert_eq!(row.ema9, Some(6008.5));
        assert_eq!(row.ema21, Some(6005.0));
        assert_eq!(row.ema50, None);
        assert_eq!(row.ema21_slope_5m, Some(0.12));
        assert_eq!(row.ema21_slope_15m, Some(-0.35));
        assert_eq!(row.ema21_slope_30m, Some(0.4));
        assert_eq!(row.ret_5m_pct, Some(0.05));
        assert_eq!(row.ret_15m_pct, Some(-0.125));
        assert_eq!(row.ret_30m_pct, None);
    }
}
