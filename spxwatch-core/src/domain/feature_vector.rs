//! FeatureVector: derived indicator snapshot for one observation.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Indicator snapshot computed from the trailing window ending at `timestamp`.
///
/// Raw observation fields are always present. Every derived field is `None`
/// until its indicator has seen enough samples (warmup), or when it is
/// undefined (premium ratio with a zero expected move).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub timestamp: DateTime<FixedOffset>,
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
    /// 0 = lower band, 1 = upper band.
    pub band_position: Option<f64>,

    pub premium_ratio: Option<f64>,
    /// Market close minute-of-day minus current minute-of-day. Negative after close.
    pub minutes_to_close: i64,

    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub ema50: Option<f64>,

    /// EMA21 change per minute over the trailing horizon.
    pub ema21_slope_5m: Option<f64>,
    pub ema21_slope_15m: Option<f64>,
    pub ema21_slope_30m: Option<f64>,

    /// Percentage price change over the trailing horizon.
    pub ret_5m_pct: Option<f64>,
    pub ret_15m_pct: Option<f64>,
    pub ret_30m_pct: Option<f64>,
}

impl FeatureVector {
    /// True once every derived indicator has a value.
    ///
    /// Premium ratio is excluded: it is undefined by construction when the
    /// expected move is zero, not because of missing history.
    pub fn is_warm(&self) -> bool {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.ema9,
            self.ema21,
            self.ema50,
            self.ema21_slope_5m,
            self.ema21_slope_15m,
            self.ema21_slope_30m,
            self.ret_5m_pct,
            self.ret_15m_pct,
            self.ret_30m_pct,
        ]
        .iter()
        .all(Option::is_some)
    }
}
