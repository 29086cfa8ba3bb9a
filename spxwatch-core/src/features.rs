//! Feature engine: full recomputation of the indicator set over the buffer.
//!
//! Every update recomputes the whole trailing window rather than patching
//! the previous result. Session windows are a few hundred rows, so the cost is
//! negligible and the output is a pure function of the buffer contents.

use serde::{Deserialize, Serialize};

use crate::buffer::TimeSeriesBuffer;
use crate::domain::{FeatureVector, Observation};
use crate::indicators::{
    finite, pct_change, slope_per_minute, Bollinger, Ema, Macd, Rsi, SeriesIndicator,
};

/// Horizons (minutes) for EMA21 slopes and price returns.
pub const HORIZONS_MIN: [u32; 3] = [5, 15, 30];

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub rsi_period: usize,
    /// Sampling interval of the observation grid, in minutes.
    pub interval_min: u32,
    /// Market close as minutes since local midnight (16:00 → 960).
    pub market_close_minute: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            interval_min: 1,
            market_close_minute: 16 * 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureEngine {
    config: FeatureConfig,
    rsi: Rsi,
    macd: Macd,
    bollinger: Bollinger,
    ema9: Ema,
    ema21: Ema,
    ema50: Ema,
}

impl FeatureEngine {
    pub fn new(config: FeatureConfig) -> Self {
        assert!(config.interval_min >= 1, "interval_min must be >= 1");
        Self {
            rsi: Rsi::new(config.rsi_period),
            macd: Macd::standard(),
            bollinger: Bollinger::new(BOLLINGER_PERIOD, BOLLINGER_MULT),
            ema9: Ema::new(9),
            ema21: Ema::new(21),
            ema50: Ema::new(50),
            config,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Rows spanned by a horizon of `minutes` on this engine's grid (at least one).
    pub fn horizon_rows(&self, minutes: u32) -> usize {
        (minutes / self.config.interval_min).max(1) as usize
    }

    /// One feature vector per buffered observation, oldest first.
    pub fn recompute(&self, buffer: &TimeSeriesBuffer) -> Vec<FeatureVector> {
        let observations: Vec<Observation> = buffer.iter().copied().collect();
        self.compute(&observations)
    }

    /// Feature vector for the newest observation, if any.
    pub fn latest(&self, buffer: &TimeSeriesBuffer) -> Option<FeatureVector> {
        self.recompute(buffer).pop()
    }

    pub fn compute(&self, observations: &[Observation]) -> Vec<FeatureVector> {
        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();

        let rsi = self.rsi.compute(&prices);
        let macd = self.macd.compute(&prices);
        let bands = self.bollinger.compute(&prices);
        let ema9 = self.ema9.compute(&prices);
        let ema21 = self.ema21.compute(&prices);
        let ema50 = self.ema50.compute(&prices);

        let [slope_5m, slope_15m, slope_30m] = HORIZONS_MIN.map(|h| {
            let rows = self.horizon_rows(h);
            let minutes = (rows as u32 * self.config.interval_min) as f64;
            slope_per_minute(&ema21, rows, minutes)
        });
        let [ret_5m, ret_15m, ret_30m] =
            HORIZONS_MIN.map(|h| pct_change(&prices, self.horizon_rows(h)));

        observations
            .iter()
            .enumerate()
            .map(|(i, obs)| FeatureVector {
                timestamp: obs.timestamp,
                price: obs.price,
                expected_move: obs.expected_move,
                otm_premium: obs.otm_premium,
                vix: obs.vix,
                rsi: finite(rsi[i]),
                macd: finite(macd.line[i]),
                macd_signal: finite(macd.signal[i]),
                macd_hist: finite(macd.histogram[i]),
                bb_upper: finite(bands.upper[i]),
                bb_middle: finite(bands.middle[i]),
                bb_lower: finite(bands.lower[i]),
                band_position: finite(bands.position(i, obs.price)),
                premium_ratio: premium_ratio(obs.otm_premium, obs.expected_move),
                minutes_to_close: self.config.market_close_minute - obs.minute_of_day(),
                ema9: finite(ema9[i]),
                ema21: finite(ema21[i]),
                ema50: finite(ema50[i]),
                ema21_slope_5m: finite(slope_5m[i]),
                ema21_slope_15m: finite(slope_15m[i]),
                ema21_slope_30m: finite(slope_30m[i]),
                ret_5m_pct: finite(ret_5m[i]),
                ret_15m_pct: finite(ret_15m[i]),
                ret_30m_pct: finite(ret_30m[i]),
            })
            .collect()
    }
}

/// OTM premium ÷ expected move; `None` when the expected move is exactly zero.
pub fn premium_ratio(otm_premium: f64, expected_move: f64) -> Option<f64> {
    if expected_move == 0.0 {
        None
    } else {
        finite(otm_premium / expected_move)
    }
}
